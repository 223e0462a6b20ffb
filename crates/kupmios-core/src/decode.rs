//! Strict decoding of untrusted JSON bodies into typed wire records.
//!
//! Shapes are declared with serde derives on the schema structs; anything that
//! does not match, including unknown fields where a record denies them, is a
//! [`DecodeError`] naming what was being decoded.

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Longest body excerpt carried in a decode error message.
const BODY_EXCERPT_LEN: usize = 512;

pub fn decode_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, DecodeError> {
    serde_json::from_str(body)
        .map_err(|e| DecodeError::new(what, format!("{e}; body={}", excerpt(body))))
}

pub fn decode_value<T: DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| DecodeError::new(what, e))
}

fn excerpt(body: &str) -> &str {
    if body.len() <= BODY_EXCERPT_LEN {
        return body;
    }
    let mut end = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
