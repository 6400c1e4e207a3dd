use thiserror::Error;

/// Hard failures of the engine.
///
/// Everything that is merely imperfect about a document (unlabeled blanks,
/// oversized blocks) is reported as a warning next to the result instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Field pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Form values are not valid JSON: {0}")]
    Values(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = EngineError::InvalidInput("content height must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: content height must be positive"
        );
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: EngineError = toml::from_str::<toml::Value>("= nope")
            .map_err(EngineError::from)
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
