//! Error types for the simulation.

use crate::types::Coordinate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Coordinate {coordinate} is outside the {cols}x{rows} grid")]
    OutOfBounds {
        coordinate: Coordinate,
        cols: i32,
        rows: i32,
    },

    #[error("Evaluation failure: {0}")]
    Evaluation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    /// Shorthand used by parameter validation.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = Error::OutOfBounds {
            coordinate: Coordinate::new(5, -1),
            cols: 4,
            rows: 4,
        };
        assert_eq!(err.to_string(), "Coordinate (5, -1) is outside the 4x4 grid");
    }

    #[test]
    fn test_json_error_conversion() {
        let err: Error = serde_json::from_str::<u8>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
