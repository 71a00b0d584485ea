pub mod client;
pub mod config;
pub mod options;

pub use client::Client;
pub use config::{ClientConfig, ClientOption};
pub use options::{
    with_basic_auth, with_cancellation, with_getter, with_header, with_insecure, with_progress,
};
