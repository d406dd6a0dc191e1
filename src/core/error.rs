//! Classified errors that callers need to match on.
//!
//! Everything else travels as `anyhow::Error` with context attached.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Sign-in or row access refused. The message never says why.
    #[error("Invalid login credentials")]
    Unauthorized,

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Record not found: {table}/{id}")]
    NotFound { table: String, id: String },

    #[error("Record already exists: {table}/{id}")]
    Conflict { table: String, id: String },

    #[error("Asset row {id} has category {found}, expected {expected}")]
    WrongCategory {
        id: String,
        expected: &'static str,
        found: String,
    },
}
