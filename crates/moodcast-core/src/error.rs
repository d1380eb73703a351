use thiserror::Error;

/// Top-level error type for the Moodcast system.
///
/// Only infrastructure failures live here. Suppressions and empty queues are
/// ordinary outcomes and never surface as a `MoodcastError`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MoodcastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<toml::de::Error> for MoodcastError {
    fn from(err: toml::de::Error) -> Self {
        MoodcastError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MoodcastError {
    fn from(err: toml::ser::Error) -> Self {
        MoodcastError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MoodcastError {
    fn from(err: serde_json::Error) -> Self {
        MoodcastError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Moodcast operations.
pub type Result<T> = std::result::Result<T, MoodcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases: Vec<(MoodcastError, &str)> = vec![
            (
                MoodcastError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                MoodcastError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                MoodcastError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
            (
                MoodcastError::InvalidSettings("hour 25".to_string()),
                "Invalid settings: hour 25",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MoodcastError = io_err.into();
        assert!(matches!(err, MoodcastError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: MoodcastError = err.unwrap_err().into();
        assert!(matches!(err, MoodcastError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: MoodcastError = err.unwrap_err().into();
        assert!(matches!(err, MoodcastError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
