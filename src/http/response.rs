//! Successful response representation and lenient body decoding

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A classified 2xx response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded body; `Null` when the server sent nothing
    pub body: Value,
}

impl ApiResponse {
    /// Whether the server sent no data
    pub fn is_empty(&self) -> bool {
        self.body.is_null()
    }

    /// Deserialize the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Decode a response body without failing
///
/// Blank text becomes `Null`. Anything else is parsed as JSON, and text that
/// is not JSON is kept as a JSON string.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
