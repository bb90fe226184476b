//! HTTP API module.
//!
//! The axum server, its response types, and the pipeline log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::start_server;
pub use types::*;
