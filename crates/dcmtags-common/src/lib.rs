//! dcmtags Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the dcmtags workspace members.
//!
//! - **Logging**: tracing subscriber setup driven by environment variables
//!
//! # Example
//!
//! ```no_run
//! use dcmtags_common::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env().unwrap_or_default();
//! init_logging(&config).ok();
//! ```

pub mod logging;

pub use logging::{init_logging, LogConfig};
