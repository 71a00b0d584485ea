pub mod log_tracker;
pub mod reader;
pub mod tracker;

pub use log_tracker::LogProgressTracker;
pub use reader::{ProgressReader, ReadEvent};
pub use tracker::{noop_progress_tracker, NoopProgressTracker, ProgressTracker};
