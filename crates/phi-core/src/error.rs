//! Fatal error kinds. Per spec §7 the engine raises no exceptions -- every
//! non-fatal failure mode (`UnknownBuiltin`, `DataizationStuck`,
//! `Termination`, `BoundExceeded`) is represented as a value, not an
//! `Error`. Only rule compilation failures are fatal at this layer; parsing
//! failures are raised by `phi-syntax` using the same enum.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed rule `{rule}`: {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),
}
