#![forbid(unsafe_code)]

pub mod error;
pub mod progress_service;

pub use course_core::Clock;

pub use error::ProgressError;
pub use progress_service::{CourseReport, ProgressService, StatusUpdate};
