//! Logging.
//!
//! Process-wide logger setup over the `log` facade, plus the bounded line
//! journal the panel displays.

mod init;
mod journal;

pub use init::{init_logging, LoggingConfig};
pub use journal::LogJournal;
