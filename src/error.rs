//! Error types for the Oracle adapter.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for adapter operations.
///
/// Driver implementations report failures through the same type, so a
/// rejected statement surfaces to the caller exactly as the driver built it.
#[derive(Error, Debug)]
pub enum Error {
    /// The driver session could not be established.
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// Opening the session took longer than the configured timeout.
    #[error("Connection to {host} timed out after {timeout:?}")]
    ConnectionTimeout {
        host: String,
        timeout: std::time::Duration,
    },

    /// The driver rejected a statement (syntax, constraint, type mismatch).
    #[error("ORA-{code:05}: {message}")]
    Statement { code: u32, message: String },

    /// A cursor or large object could not be read or written.
    #[error("Resource error: {message}")]
    Resource { message: String },

    /// Commit or rollback was issued outside a transaction, or begin inside one.
    #[error("Transaction state error: {message}")]
    TransactionState { message: String },

    /// Type conversion error.
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },

    /// Column not found.
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// Invalid connection configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A statement returned a shape the adapter did not expect.
    #[error("Unexpected result: {message}")]
    UnexpectedResult { message: String },
}

impl Error {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a statement error with the driver's error code.
    pub fn statement(code: u32, message: impl Into<String>) -> Self {
        Self::Statement {
            code,
            message: message.into(),
        }
    }

    /// Create a resource (cursor/LOB) error.
    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource {
            message: message.into(),
        }
    }

    /// Create a transaction state error.
    pub fn transaction_state(message: impl Into<String>) -> Self {
        Self::TransactionState {
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Create an unexpected result error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            message: message.into(),
        }
    }

    /// Whether the session could not be established at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::ConnectionTimeout { .. })
    }

    /// Whether the driver rejected the SQL text.
    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Statement { .. })
    }

    /// Whether a cursor or LOB operation failed.
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource { .. })
    }

    /// Rewrap any error as a resource error, keeping resource errors as they are.
    pub(crate) fn into_resource(self) -> Self {
        match self {
            Self::Resource { .. } => self,
            other => Self::resource(other.to_string()),
        }
    }
}
