//! Transaction history for the desk.
//!
//! Records are kept newest-first in memory (bounded) and appended to one JSON
//! array file per UTC day. Disk failures never reach the caller; they are
//! logged and the in-memory history stays authoritative.

pub mod error;
pub mod export;
pub mod log;
pub mod record;

pub use error::StoreError;
pub use export::{to_csv, CSV_HEADER};
pub use log::{LogQuery, TransactionLog, DEFAULT_QUERY_LIMIT, RECENT_DAYS};
pub use record::{RecordConfig, RecordKind, TransactionRecord};
