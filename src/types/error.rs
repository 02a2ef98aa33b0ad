use crate::model::TaskType;
use thiserror::Error;

/// equipment error types
#[derive(Error, Debug)]
pub enum EquipmentError {
    /// Socket, serial or file I/O failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport to the print server failed
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON could not be mapped to or from the wire types
    #[error("mapping error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// A task in a batch could not be executed
    #[error("Failed to execute task {task}. {reason}")]
    Execute { task: TaskType, reason: String },

    /// The driver does not implement this call
    #[error("The method isn't supported: {0}")]
    NotSupported(&'static str),

    /// No matching printer is attached
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// libusb reported a failure
    #[error("usb error: {0}")]
    Usb(String),

    /// Print server address cannot be turned into a URL
    #[error("wrong url format: {0}")]
    InvalidUrl(String),

    /// Print server answered with a failure result
    #[error("{0}")]
    Server(String),

    /// Menu resource id is not registered
    #[error("menu resource {0} not found")]
    MenuNotFound(i32),
}

/// Coarse classification used for messages shown to an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Mapping,
    Unknown,
}

impl EquipmentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EquipmentError::Http(e) if e.is_decode() => ErrorCategory::Mapping,
            EquipmentError::Http(_) | EquipmentError::InvalidUrl(_) => ErrorCategory::Network,
            EquipmentError::Io(e) if is_network_io(e) => ErrorCategory::Network,
            EquipmentError::Json(_) => ErrorCategory::Mapping,
            _ => ErrorCategory::Unknown,
        }
    }

    /// One-line message suitable for showing at the counter
    pub fn user_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network error: {}", self),
            ErrorCategory::Mapping => format!("Data mapping error: {}", self),
            ErrorCategory::Unknown => format!("Unknown error: {}", self),
        }
    }
}

/// True for I/O errors caused by an unreachable or silent peer
pub fn is_network_io(e: &std::io::Error) -> bool {
    use std::io::ErrorKind::*;
    matches!(
        e.kind(),
        ConnectionRefused
            | ConnectionReset
            | ConnectionAborted
            | NotConnected
            | AddrNotAvailable
            | TimedOut
            | HostUnreachable
            | NetworkUnreachable
    )
}

/// Result type alias for equipment
pub type Result<T> = std::result::Result<T, EquipmentError>;
