//! Error types for vrma_loader

use thiserror::Error;

/// Main error type for clip loading operations
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("GLTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_message_carries_parser_message() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let parser_message = parse_err.to_string();

        let err = LoaderError::from(parse_err);
        let message = err.to_string();

        assert!(message.starts_with("Failed to parse JSON: "));
        assert!(message.contains(&parser_message));
    }
}
