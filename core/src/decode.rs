//! JSON decoding of success payloads and error bodies.
//!
//! Wire names are lower snake case, which is what serde derives from Rust
//! field names, so models only rename the odd `_id` / `_total` field.
//! Unknown fields are ignored and optional fields fall back to their
//! `#[serde(default)]`. Anything structurally wrong is a `DecodeError`;
//! there is no partial result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has no `{0}` field")]
    MissingField(String),
}

/// Shape of a failure body, e.g.
/// `{"error":"Not Found","status":404,"message":"Channel 'x' does not exist"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    pub message: String,
}

/// Decodes a success body into `T`.
pub fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}

/// Produces the value for an expected no-content response without looking
/// at the body. Works for any `T` that accepts JSON `null`: `Empty`, `()`
/// and `Option<_>`.
pub fn decode_no_content<T: DeserializeOwned>() -> Result<T, DecodeError> {
    Ok(serde_json::from_value(Value::Null)?)
}

/// Parses a failure body. Same strictness as [`decode_payload`]: a body
/// without a string `message` is an error.
pub fn translate_error(body: &[u8]) -> Result<ErrorPayload, DecodeError> {
    decode_payload(body)
}

/// Takes field `name` out of a decoded JSON object and decodes it as `T`.
pub fn project_field<T: DeserializeOwned>(mut document: Value, name: &str) -> Result<T, DecodeError> {
    let field = document
        .get_mut(name)
        .map(Value::take)
        .ok_or_else(|| DecodeError::MissingField(name.to_string()))?;
    Ok(serde_json::from_value(field)?)
}
