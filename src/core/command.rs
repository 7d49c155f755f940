use async_trait::async_trait;
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Unavailable {
        message: String,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // the request was understood but a reservation rule refused it
    Rejected {
        message: String,
        reason_code: Option<String>,
    },
    Conflict {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::StorageUnavailable { message, retryable, .. } => {
                CommandError::Unavailable { message, retryable }
            }
            LibraryError::DuplicateKey { message } => {
                CommandError::DuplicateKey { message }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::Conflict { message, .. } => {
                CommandError::Conflict { message }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::QuotaExceeded { message, .. } => {
                CommandError::Rejected { message, reason_code: Some("QuotaExceeded".to_string()) }
            }
            LibraryError::HoldNotCancellable { message, .. } => {
                CommandError::Rejected { message, reason_code: Some("HoldNotCancellable".to_string()) }
            }
            LibraryError::HoldNotReady { message, .. } => {
                CommandError::Rejected { message, reason_code: Some("HoldNotReady".to_string()) }
            }
            LibraryError::UnknownPatron { message, .. } => {
                CommandError::NotFound { message }
            }
            LibraryError::UnknownItem { message, .. } => {
                CommandError::NotFound { message }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: false }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::CommandError;
    use crate::core::library::{HoldStatus, LibraryError};

    #[tokio::test]
    async fn test_should_build_command_error() {
        let _ = CommandError::Database { message: "test".to_string(), reason_code: None, retryable: false };
        let _ = CommandError::Runtime { message: "test".to_string(), reason_code: None, retryable: false };
        let _ = CommandError::Serialization { message: "test".to_string() };
        let _ = CommandError::Validation { message: "test".to_string(), reason_code: None };
    }

    #[tokio::test]
    async fn test_should_convert_library_errors() {
        assert!(matches!(CommandError::from(LibraryError::quota_exceeded("p", 5)),
            CommandError::Rejected { reason_code: Some(_), .. }));
        assert!(matches!(CommandError::from(LibraryError::hold_not_ready("h", HoldStatus::Waiting)),
            CommandError::Rejected { .. }));
        assert!(matches!(CommandError::from(LibraryError::unknown_item("b")), CommandError::NotFound { .. }));
        assert!(matches!(CommandError::from(LibraryError::unavailable("down", None, true)),
            CommandError::Unavailable { retryable: true, .. }));
        assert!(matches!(CommandError::from(LibraryError::conflict("v", None)), CommandError::Conflict { .. }));
    }
}
