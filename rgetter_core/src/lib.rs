pub mod client;
pub mod getter;
pub mod progress;
pub mod types;
