//! Repositories: one struct of associated functions per table.

pub mod generated_video_repo;
pub mod transaction_repo;
pub mod user_repo;
pub mod video_task_repo;

pub use generated_video_repo::GeneratedVideoRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
pub use video_task_repo::VideoTaskRepo;
