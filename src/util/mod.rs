//! Utility modules: logging setup and the label-enum macro

pub mod label_enum;
pub mod logging;

pub use logging::{init_from_env, init_logging, LoggingConfig};
