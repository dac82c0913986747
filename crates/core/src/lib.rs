//! Domain core for the veobot video-generation broker.
//!
//! Pure types and logic only: the provider/model catalog, star pricing,
//! request validation, and the shared error type. No I/O lives here.

pub mod catalog;
pub mod error;
pub mod pricing;
pub mod request;
pub mod types;
