use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Failed to create media element: {0}")]
    ElementCreation(String),

    #[error("Listener for `{event}` failed: {message}")]
    ListenerFailed { event: String, message: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
