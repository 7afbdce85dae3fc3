//! givescan: find charities and social-service organizations near a point.
//!
//! The search itself lives in [`givescan_search`]; this crate wraps it in
//! an HTTP service configured from the environment.

pub mod config;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use server::{ScanServer, router};
