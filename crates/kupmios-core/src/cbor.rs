//! Normalization of Plutus script payloads.
//!
//! Ledger tooling expects Plutus scripts as a CBOR byte string wrapping a CBOR
//! byte string wrapping the flat-encoded program. Indexers may hand out the
//! flat program, a single wrap, or the double wrap.

use std::convert::Infallible;

use pallas_codec::minicbor::{encode, Decoder, Encoder};

use crate::error::{CoreError, DecodeError};

/// Wrap `script_hex` in CBOR byte strings until it carries exactly two layers.
/// Already double-wrapped input is returned unchanged.
pub fn apply_double_cbor_encoding(script_hex: &str) -> Result<String, CoreError> {
    let bytes = hex::decode(script_hex).map_err(|e| DecodeError::new("script cbor hex", e))?;

    let wraps_needed = match unwrap_bytes(&bytes) {
        None => 2,
        Some(inner) if unwrap_bytes(inner).is_some() => 0,
        Some(_) => 1,
    };
    if wraps_needed == 0 {
        return Ok(script_hex.to_owned());
    }

    let mut wrapped = bytes;
    for _ in 0..wraps_needed {
        wrapped = wrap_bytes(&wrapped);
    }
    Ok(hex::encode(wrapped))
}

/// Contents of `bytes` when it is exactly one CBOR byte string.
fn unwrap_bytes(bytes: &[u8]) -> Option<&[u8]> {
    let mut decoder = Decoder::new(bytes);
    let inner = decoder.bytes().ok()?;
    (decoder.position() == bytes.len()).then_some(inner)
}

fn wrap_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::with_capacity(bytes.len() + 9));
    let _: Result<_, encode::Error<Infallible>> = encoder.bytes(bytes);
    encoder.into_writer()
}
