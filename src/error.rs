use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    MalformedExclusionInput,
    NotFound,
    Unsupported,
    Io,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingError {
    pub code: ErrorCode,
    pub message: String,
}

impl TilingError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }
}

impl fmt::Display for TilingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for TilingError {}

impl From<std::io::Error> for TilingError {
    fn from(err: std::io::Error) -> Self {
        TilingError::new(ErrorCode::Io, err.to_string())
    }
}

impl From<serde_json::Error> for TilingError {
    fn from(err: serde_json::Error) -> Self {
        TilingError::new(ErrorCode::InvalidInput, err.to_string())
    }
}

impl From<csv::Error> for TilingError {
    fn from(err: csv::Error) -> Self {
        TilingError::new(ErrorCode::Io, err.to_string())
    }
}
