pub mod activity_log;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod source;

pub use error::{DocscanError, Result};
pub use pipeline::{Pipeline, RunOutcome};
