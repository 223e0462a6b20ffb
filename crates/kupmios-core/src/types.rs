//! Domain types returned by the provider.
//!
//! These are plain owned values: the wire records they are built from live in
//! `kupo::schema` and `ogmios::schema` and never leave the decoding step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ==============================================================================
// Units and Assets
// ==============================================================================

/// Concatenation of a policy id and an asset name, both hex, or [`LOVELACE`].
pub type Unit = String;

/// Unit of the base currency.
pub const LOVELACE: &str = "lovelace";

/// Policy ids are 28-byte hashes, i.e. 56 hex characters.
pub const POLICY_ID_HEX_LEN: usize = 56;

const MAX_ASSET_NAME_HEX_LEN: usize = 64;

/// Asset quantities keyed by unit. The `lovelace` entry is always present on
/// values produced by the provider.
pub type Assets = BTreeMap<Unit, u64>;

/// Split a unit into its policy id and optional asset name.
pub fn split_unit(unit: &str) -> Result<(&str, Option<&str>), CoreError> {
    if unit.len() < POLICY_ID_HEX_LEN
        || unit.len() > POLICY_ID_HEX_LEN + MAX_ASSET_NAME_HEX_LEN
        || unit.len() % 2 != 0
        || !unit.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(CoreError::InvalidInput(format!(
            "unit `{unit}` must be a hex policy id optionally followed by a hex asset name"
        )));
    }

    let (policy_id, asset_name) = unit.split_at(POLICY_ID_HEX_LEN);
    let asset_name = (!asset_name.is_empty()).then_some(asset_name);
    Ok((policy_id, asset_name))
}

// ==============================================================================
// Addresses and Credentials
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
    Key,
    Script,
}

/// A payment credential: the hash of a verification key or of a script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "type")]
    pub kind: CredentialKind,
    pub hash: String,
}

/// What a UTxO query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddressOrCredential {
    /// A bech32 (or base58 Byron) address.
    Address(String),
    /// Every address sharing this payment credential.
    Credential(Credential),
}

impl From<Credential> for AddressOrCredential {
    fn from(credential: Credential) -> Self {
        Self::Credential(credential)
    }
}

// ==============================================================================
// Scripts
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlutusVersion {
    PlutusV1,
    PlutusV2,
    PlutusV3,
}

/// A reference script attached to an output, as hex.
///
/// Plutus payloads are double CBOR-wrapped; native scripts are kept as the
/// indexer returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "script")]
pub enum Script {
    Native(String),
    PlutusV1(String),
    PlutusV2(String),
    PlutusV3(String),
}

impl Script {
    pub fn plutus_version(&self) -> Option<PlutusVersion> {
        match self {
            Self::Native(_) => None,
            Self::PlutusV1(_) => Some(PlutusVersion::PlutusV1),
            Self::PlutusV2(_) => Some(PlutusVersion::PlutusV2),
            Self::PlutusV3(_) => Some(PlutusVersion::PlutusV3),
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Self::Native(s) | Self::PlutusV1(s) | Self::PlutusV2(s) | Self::PlutusV3(s) => s,
        }
    }
}

// ==============================================================================
// UTxOs
// ==============================================================================

/// A transaction output reference: `(tx_hash, output_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutRef {
    pub tx_hash: String,
    pub output_index: u32,
}

impl OutRef {
    pub fn new(tx_hash: impl Into<String>, output_index: u32) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            output_index,
        }
    }
}

/// An unspent transaction output with its datum and reference script
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub address: String,
    pub assets: Assets,
    /// Set only when the output carries a datum by hash.
    pub datum_hash: Option<String>,
    /// Set when the output carries an inline datum that could be resolved.
    pub datum: Option<String>,
    pub script_ref: Option<Script>,
}

impl Utxo {
    pub fn out_ref(&self) -> OutRef {
        OutRef::new(self.tx_hash.clone(), self.output_index)
    }

    pub fn lovelace(&self) -> u64 {
        self.assets.get(LOVELACE).copied().unwrap_or(0)
    }
}

// ==============================================================================
// Delegation
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    pub pool_id: Option<String>,
    pub rewards: u64,
}

// ==============================================================================
// Protocol Parameters
// ==============================================================================

/// Cost model parameters keyed by their stringified position.
pub type CostModel = BTreeMap<String, i64>;

pub type CostModels = BTreeMap<PlutusVersion, CostModel>;

/// Canonical protocol parameters.
///
/// Monetary and size fields are exact integers. Execution prices are ratios
/// reduced to `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolParameters {
    pub min_fee_a: u64,
    pub min_fee_b: u64,
    pub max_tx_size: u64,
    pub max_val_size: u64,
    pub key_deposit: u64,
    pub pool_deposit: u64,
    pub drep_deposit: u64,
    pub gov_action_deposit: u64,
    pub price_mem: f64,
    pub price_step: f64,
    pub max_tx_ex_mem: u64,
    pub max_tx_ex_steps: u64,
    pub coins_per_utxo_byte: u64,
    pub collateral_percentage: u64,
    pub max_collateral_inputs: u64,
    pub min_fee_ref_script_cost_per_byte: f64,
    pub cost_models: CostModels,
}

// ==============================================================================
// Script Evaluation
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExUnits {
    pub mem: u64,
    pub steps: u64,
}

/// Execution budget computed by the node for one redeemer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRedeemer {
    pub ex_units: ExUnits,
    pub redeemer_index: u32,
    pub redeemer_tag: String,
}
