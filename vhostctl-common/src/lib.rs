//! # vhostctl Common
//!
//! Shared utilities for the vhostctl components.
//!
//! ## Logging
//!
//! ```rust
//! use vhostctl_common::init_logging;
//!
//! // Initialize with level
//! init_logging("info").unwrap();
//! ```

pub mod logging;

pub use logging::{init_logging, init_logging_json};
