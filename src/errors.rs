use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Too many images: {selected} selected with {current} already present (maximum {max})")]
    CapacityExceeded {
        selected: usize,
        current: usize,
        max: usize,
    },

    #[error("Image index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("An upload batch is already in progress")]
    UploadInProgress,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Object store error (status {status}): {message}")]
    Storage { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Custom result type
pub type UploadResult<T> = Result<T, UploadError>;

/// Error helpers
impl UploadError {
    pub fn capacity_exceeded(selected: usize, current: usize, max: usize) -> Self {
        Self::CapacityExceeded {
            selected,
            current,
            max,
        }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn storage(status: u16, message: &str) -> Self {
        Self::Storage {
            status,
            message: message.to_string(),
        }
    }

    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
