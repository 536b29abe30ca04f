//! Error types for the IAM client library.

use std::time::Duration;
use tonic::{Code, Status};

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error reported by the server inside a finished long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct OperationError {
    pub code: Code,
    pub message: String,
}

impl From<crate::proto::RpcStatus> for OperationError {
    fn from(status: crate::proto::RpcStatus) -> Self {
        Self {
            code: Code::from_i32(status.code),
            message: status.message,
        }
    }
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected locally before any network call.
    Usage,
    /// Raised by the transport or the server while making a call.
    Rpc,
    /// Etag mismatch on update/delete. Never retried.
    Conflict,
    /// Reported asynchronously by a finished long-running operation.
    Operation,
}

/// Errors that can occur during client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Failed to establish connection to the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport-level error from tonic.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// gRPC error from the server.
    #[error("grpc error: {0}")]
    Grpc(Box<Status>),

    /// Invalid argument provided by caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed resource name provided by caller.
    #[error("invalid resource name: {0}")]
    InvalidResourceName(String),

    /// Failed to parse timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The server sent something the client cannot interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A long-running operation finished with an error.
    #[error("operation failed: {0}")]
    Operation(OperationError),

    /// Waiting on a long-running operation exceeded the caller's timeout.
    #[error("timed out after {0:?} waiting for operation")]
    WaitTimeout(Duration),

    /// Client configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<Status> for ClientError {
    fn from(status: Status) -> Self {
        ClientError::Grpc(Box::new(status))
    }
}

impl From<OperationError> for ClientError {
    fn from(err: OperationError) -> Self {
        ClientError::Operation(err)
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl ClientError {
    /// Returns the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::Connection(msg) => msg.clone(),
            ClientError::Transport(e) => e.to_string(),
            ClientError::Grpc(s) => s.message().to_string(),
            ClientError::InvalidArgument(msg) => msg.clone(),
            ClientError::InvalidResourceName(msg) => msg.clone(),
            ClientError::InvalidTimestamp(msg) => msg.clone(),
            ClientError::InvalidResponse(msg) => msg.clone(),
            ClientError::Operation(e) => e.message.clone(),
            ClientError::WaitTimeout(d) => format!("timed out after {:?}", d),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    /// Returns the status code carried by a gRPC or operation error.
    pub fn code(&self) -> Option<Code> {
        match self {
            ClientError::Grpc(s) => Some(s.code()),
            ClientError::Operation(e) => Some(e.code),
            ClientError::WaitTimeout(_) => Some(Code::DeadlineExceeded),
            _ => None,
        }
    }

    /// Returns the underlying gRPC Status if this is a gRPC error.
    pub fn status(&self) -> Option<&Status> {
        match self {
            ClientError::Grpc(s) => Some(s),
            _ => None,
        }
    }

    /// Classifies the error into usage, rpc, conflict or operation failures.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::InvalidArgument(_)
            | ClientError::InvalidResourceName(_)
            | ClientError::InvalidTimestamp(_)
            | ClientError::Config(_) => ErrorCategory::Usage,
            ClientError::Operation(_) => ErrorCategory::Operation,
            ClientError::Grpc(s) if is_conflict_code(s.code()) => ErrorCategory::Conflict,
            _ => ErrorCategory::Rpc,
        }
    }

    /// Returns true if the server rejected a stale etag.
    pub fn is_conflict(&self) -> bool {
        self.category() == ErrorCategory::Conflict
            || matches!(self, ClientError::Operation(e) if is_conflict_code(e.code))
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.code(), Some(Code::NotFound))
    }

    /// Returns true if this is an "invalid argument" error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.code(), Some(Code::InvalidArgument))
            || matches!(self, ClientError::InvalidArgument(_))
    }

    /// Returns true if this is a connection or transport error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ClientError::Connection(_) | ClientError::Transport(_))
    }

    /// Returns true if this error came from waiting too long, not from the server.
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, ClientError::WaitTimeout(_))
    }
}

/// IAM answers an etag mismatch with ABORTED; FAILED_PRECONDITION is treated the same.
pub(crate) fn is_conflict_code(code: Code) -> bool {
    matches!(code, Code::Aborted | Code::FailedPrecondition)
}
