//! Row models and DTOs for the veobot tables.

pub mod generated_video;
pub mod transaction;
pub mod user;
pub mod video_task;
