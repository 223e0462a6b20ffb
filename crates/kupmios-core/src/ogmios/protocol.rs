use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, DecodeError};

#[derive(Serialize)]
pub(super) struct JsonRpcRequest<'a, P: Serialize> {
    pub(super) jsonrpc: &'static str,
    pub(super) method: &'a str,
    pub(super) params: P,
    pub(super) id: u64,
}

/// Envelope of every Ogmios answer. Exactly one of `result` / `error` must be
/// present; a `null` result counts as present.
#[derive(Deserialize)]
pub(super) struct JsonRpcResponse {
    pub(super) jsonrpc: String,
    pub(super) method: String,
    pub(super) id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub(super) result: Option<serde_json::Value>,
    #[serde(default)]
    pub(super) error: Option<serde_json::Value>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(d).map(Some)
}

/// Split a decoded envelope into its result, or the remote error verbatim.
pub(super) fn rpc_outcome(
    method: &str,
    response: JsonRpcResponse,
) -> Result<serde_json::Value, CoreError> {
    if response.jsonrpc != "2.0" {
        return Err(DecodeError::new(
            format!("ogmios {method} envelope"),
            format!("unsupported jsonrpc version `{}`", response.jsonrpc),
        )
        .into());
    }

    match (response.result, response.error) {
        (Some(result), None) => Ok(result),
        (None, Some(error)) => Err(CoreError::Remote(error)),
        (Some(_), Some(_)) => Err(DecodeError::new(
            format!("ogmios {method} envelope"),
            "both `result` and `error` are present",
        )
        .into()),
        (None, None) => Err(DecodeError::new(
            format!("ogmios {method} envelope"),
            "neither `result` nor `error` is present",
        )
        .into()),
    }
}
