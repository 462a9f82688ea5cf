//! Result records and the JSON Lines results file

pub mod record;
pub mod sink;

pub use record::{truncate_log, AuditRecord, DEFAULT_LOG_LIMIT};
pub use sink::{JsonlSink, SinkError};
