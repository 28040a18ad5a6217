//! Shared utilities for the RLUSD desk.

pub mod logging;

pub use logging::{init_logging, LogFormat};
