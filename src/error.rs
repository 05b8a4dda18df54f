/// Error types for rule decoding and the browser bridge
use thiserror::Error;

/// Why a `filters` / `sort` parameter value could not be decoded
#[derive(Debug, Error)]
pub enum RuleDecodeError {
    #[error("value is not a JSON array after percent-decoding: {0}")]
    NotAnArray(String),

    #[error("invalid percent-encoding: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the extension APIs through the JS glue
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("tab error: {0}")]
    Tabs(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("DOM error: {0}")]
    Dom(String),
}

impl From<serde_wasm_bindgen::Error> for BridgeError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        BridgeError::Serialize(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages() {
        let err = RuleDecodeError::NotAnArray("abc".to_string());
        assert_eq!(err.to_string(), "value is not a JSON array after percent-decoding: abc");

        let json_err = serde_json::from_str::<Vec<u8>>("[x").unwrap_err();
        let err = RuleDecodeError::from(json_err);
        assert!(err.to_string().starts_with("invalid rule JSON"));
    }

    #[test]
    fn test_bridge_error_messages() {
        assert_eq!(BridgeError::Storage("quota".to_string()).to_string(), "storage error: quota");
        assert_eq!(BridgeError::Tabs("closed".to_string()).to_string(), "tab error: closed");
    }
}
