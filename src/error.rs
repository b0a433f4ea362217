use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not allocate {bytes} bytes for {what}: {reason}\n{hint}")]
    Allocation {
        what: &'static str,
        bytes: usize,
        reason: String,
        hint: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Station table overflow: {0}")]
    Capacity(String),
}

impl ProcessingError {
    pub fn allocation(
        what: &'static str,
        bytes: usize,
        reason: impl ToString,
        hint: &'static str,
    ) -> Self {
        ProcessingError::Allocation {
            what,
            bytes,
            reason: reason.to_string(),
            hint,
        }
    }
}
