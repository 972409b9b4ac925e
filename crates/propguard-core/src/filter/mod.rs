//! Sensitive-value filter
//!
//! Redaction happens when the management surface is read; the property
//! table keeps the clear values for the process's own use.

mod redacting;
mod sensitive;

pub use redacting::{RedactingRuntime, REDACTION_MARKER};
pub use sensitive::{SensitiveValueFilter, FilterError, FilterResult};
