//! Shared test helpers for `kupmios-core` unit tests.
//!
//! Consolidates fixture hashes, builders for Kupo records and the Ogmios
//! protocol-parameter fixture so tests across modules share a single source
//! of truth for dummy data construction.

use std::collections::BTreeMap;

use crate::kupo::schema::{KupoPoint, KupoScript, KupoUtxo, KupoValue, ScriptLanguage};
use crate::ogmios::OgmiosProtocolParameters;

// ==============================================================================
// Fixture Hashes
// ==============================================================================

pub const TX_A: &str = "0268be9dbd0446eaa217e1dec8f399249305e551d7fc1437dd84521f74aa621c";
pub const TX_B: &str = "d9e6f4ab5bd2b2cef2e8bb3b0bf1e3bcbbee0fb9e26d0cbd0cf9d8e1e3c3a1b7";
pub const ADDRESS: &str =
    "addr_test1vz09v9yfxguvlp0zsnrpa3tdtm7el8xufp3m5lsm7qxzclgmzkket";
pub const PAYMENT_KEY_HASH: &str = "9e5614893238cf85e284c61ec56d5efd9f9cdc4863ba7e1bf00c2c7d";
pub const POLICY: &str = "a0028f350aaabe0545fdcb56b039bfb08e4bb4d8c4d7c3c7d481c235";
pub const ASSET_NAME: &str = "484f534b59";
pub const DATUM_HASH: &str = "923918e403bf43c34b4ef6b48eb2ee04babed17320d8d1b9ff9ad086e86f44ec";
pub const SCRIPT_HASH: &str = "67f33146617a5e61936081db3b2117cbf59bd2123748f58ac9678656";

// ==============================================================================
// Kupo Record Builders
// ==============================================================================

/// A plain unspent output holding only lovelace. Override fields after
/// construction when needed.
pub fn kupo_utxo(tx_hash: &str, output_index: u32, lovelace: u64) -> KupoUtxo {
    KupoUtxo {
        transaction_index: 3,
        transaction_id: tx_hash.to_owned(),
        output_index,
        address: ADDRESS.to_owned(),
        value: KupoValue {
            coins: lovelace,
            assets: BTreeMap::new(),
        },
        datum_hash: None,
        datum_type: None,
        script_hash: None,
        created_at: KupoPoint {
            slot_no: 41_000_000,
            header_hash: "2e6b2e2a0f1e4a6a9f4c1b8c7e0b0d6a7a3c8d9e1f2b3c4d5e6f708192a3b4c5"
                .to_owned(),
        },
        spent_at: None,
    }
}

/// The JSON Kupo sends for [`kupo_utxo`], byte-for-byte in its field naming.
pub fn kupo_match_json(tx_hash: &str, output_index: u32) -> serde_json::Value {
    serde_json::to_value(kupo_utxo(tx_hash, output_index, 1_500_000))
        .expect("fixture record serializes")
}

pub fn plutus_v2_script(flat_cbor_hex: &str) -> KupoScript {
    KupoScript {
        language: ScriptLanguage::PlutusV2,
        script: flat_cbor_hex.to_owned(),
    }
}

// ==============================================================================
// Ogmios Fixtures
// ==============================================================================

pub const PROTOCOL_PARAMETERS_JSON: &str =
    include_str!("../tests/fixtures/protocol_parameters.json");

/// Conway-era parameters as reported by a preprod node.
pub fn ogmios_protocol_parameters() -> OgmiosProtocolParameters {
    serde_json::from_str(PROTOCOL_PARAMETERS_JSON).expect("fixture must decode")
}
