use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure reported by the schedule store. Opaque beyond its
/// displayable message.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
