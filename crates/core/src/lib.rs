#![forbid(unsafe_code)]

pub mod format;
pub mod model;
pub mod time;

pub use format::format_duration;
pub use time::Clock;
