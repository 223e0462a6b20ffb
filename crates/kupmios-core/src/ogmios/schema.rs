//! Ogmios v6 result shapes and the request payloads built from domain types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{split_unit, Delegation, EvalRedeemer, ExUnits, Script, Utxo, LOVELACE};

// ==============================================================================
// Shared Building Blocks
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lovelace {
    pub lovelace: u64,
}

/// `{ "ada": { "lovelace": n } }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaAmount {
    pub ada: Lovelace,
}

impl AdaAmount {
    pub fn lovelace(&self) -> u64 {
        self.ada.lovelace
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteSize {
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionUnits {
    pub memory: u64,
    pub cpu: u64,
}

/// A rational encoded as `"numerator/denominator"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl FromStr for Ratio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (numerator, denominator) = s
            .split_once('/')
            .ok_or_else(|| format!("ratio `{s}` is not of the form n/d"))?;
        let numerator = numerator
            .parse::<u64>()
            .map_err(|e| format!("ratio `{s}` numerator: {e}"))?;
        let denominator = denominator
            .parse::<u64>()
            .map_err(|e| format!("ratio `{s}` denominator: {e}"))?;
        if denominator == 0 {
            return Err(format!("ratio `{s}` has a zero denominator"));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ==============================================================================
// Protocol Parameters
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinFeeReferenceScripts {
    pub base: f64,
    pub range: u64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeThresholds {
    pub default: Ratio,
    pub state_of_no_confidence: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolParameterUpdateThresholds {
    pub security: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakePoolVotingThresholds {
    pub no_confidence: Ratio,
    pub constitutional_committee: CommitteeThresholds,
    pub hard_fork_initiation: Ratio,
    pub protocol_parameters_update: PoolParameterUpdateThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrepParameterUpdateThresholds {
    pub network: Ratio,
    pub economic: Ratio,
    pub technical: Ratio,
    pub governance: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrepVotingThresholds {
    pub no_confidence: Ratio,
    pub constitutional_committee: CommitteeThresholds,
    pub constitution: Ratio,
    pub hard_fork_initiation: Ratio,
    pub protocol_parameters_update: DrepParameterUpdateThresholds,
    pub treasury_withdrawals: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlutusCostModels {
    #[serde(rename = "plutus:v1")]
    pub plutus_v1: Vec<i64>,
    #[serde(rename = "plutus:v2")]
    pub plutus_v2: Vec<i64>,
    #[serde(rename = "plutus:v3")]
    pub plutus_v3: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptExecutionPrices {
    pub memory: Ratio,
    pub cpu: Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u64,
    pub minor: u64,
}

/// Result of `queryLedgerState/protocolParameters` (Conway era).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgmiosProtocolParameters {
    pub min_fee_coefficient: u64,
    pub min_fee_reference_scripts: MinFeeReferenceScripts,
    pub max_reference_scripts_size: ByteSize,
    pub stake_pool_voting_thresholds: StakePoolVotingThresholds,
    pub delegate_representative_voting_thresholds: DrepVotingThresholds,
    pub constitutional_committee_min_size: u64,
    pub constitutional_committee_max_term_length: u64,
    pub governance_action_lifetime: u64,
    pub governance_action_deposit: AdaAmount,
    pub delegate_representative_deposit: AdaAmount,
    pub delegate_representative_max_idle_time: u64,
    pub min_fee_constant: AdaAmount,
    pub max_block_body_size: ByteSize,
    pub max_block_header_size: ByteSize,
    pub max_transaction_size: ByteSize,
    pub stake_credential_deposit: AdaAmount,
    pub stake_pool_deposit: AdaAmount,
    pub stake_pool_retirement_epoch_bound: u64,
    pub desired_number_of_stake_pools: u64,
    pub stake_pool_pledge_influence: Ratio,
    pub monetary_expansion: Ratio,
    pub treasury_expansion: Ratio,
    pub min_stake_pool_cost: AdaAmount,
    pub min_utxo_deposit_constant: AdaAmount,
    pub min_utxo_deposit_coefficient: u64,
    pub plutus_cost_models: PlutusCostModels,
    pub script_execution_prices: ScriptExecutionPrices,
    pub max_execution_units_per_transaction: ExecutionUnits,
    pub max_execution_units_per_block: ExecutionUnits,
    pub max_value_size: ByteSize,
    pub collateral_percentage: u64,
    pub max_collateral_inputs: u64,
    pub version: ProtocolVersion,
}

// ==============================================================================
// Reward Accounts
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDelegate {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccountSummary {
    #[serde(default)]
    pub delegate: Option<PoolDelegate>,
    pub rewards: AdaAmount,
    pub deposit: AdaAmount,
}

/// Result of `queryLedgerState/rewardAccountSummaries`, keyed by credential.
pub type RewardAccountSummaries = Option<BTreeMap<String, RewardAccountSummary>>;

/// The first (and for a single-key query, only) summary, or an undelegated
/// account with no rewards when the node knows nothing about the key.
pub fn to_delegation(summaries: RewardAccountSummaries) -> Delegation {
    let summary = summaries.and_then(|map| map.into_values().next());
    match summary {
        Some(summary) => Delegation {
            pool_id: summary.delegate.map(|d| d.id),
            rewards: summary.rewards.lovelace(),
        },
        None => Delegation {
            pool_id: None,
            rewards: 0,
        },
    }
}

// ==============================================================================
// Submission and Evaluation
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TransactionCbor<'a> {
    pub cbor: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionId {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub transaction: TransactionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemerPointer {
    pub purpose: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemerBudget {
    pub validator: RedeemerPointer,
    pub budget: ExecutionUnits,
}

impl From<RedeemerBudget> for EvalRedeemer {
    fn from(item: RedeemerBudget) -> Self {
        EvalRedeemer {
            ex_units: ExUnits {
                mem: item.budget.memory,
                steps: item.budget.cpu,
            },
            redeemer_index: item.validator.index,
            redeemer_tag: item.validator.purpose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OgmiosScript {
    pub language: &'static str,
    pub cbor: String,
}

/// `{ "ada": { "lovelace": n }, "<policy>": { "<asset name>": qty } }`
pub type OgmiosValue = BTreeMap<String, BTreeMap<String, u64>>;

/// A UTxO in the shape `evaluateTransaction` accepts as additional context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OgmiosUtxo {
    pub transaction: TransactionId,
    pub index: u32,
    pub address: String,
    pub value: OgmiosValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<OgmiosScript>,
}

/// Convert a domain UTxO for `evaluateTransaction`. Native reference
/// scripts are not representable there and are dropped.
pub fn to_ogmios_utxo(utxo: &Utxo) -> Result<OgmiosUtxo, CoreError> {
    let mut value = OgmiosValue::new();
    value.insert(
        "ada".to_owned(),
        BTreeMap::from([(LOVELACE.to_owned(), utxo.lovelace())]),
    );
    for (unit, quantity) in &utxo.assets {
        if unit == LOVELACE {
            continue;
        }
        let (policy_id, asset_name) = split_unit(unit)?;
        value
            .entry(policy_id.to_owned())
            .or_default()
            .insert(asset_name.unwrap_or_default().to_owned(), *quantity);
    }

    let script = utxo.script_ref.as_ref().and_then(|script| {
        let language = match script {
            Script::Native(_) => return None,
            Script::PlutusV1(_) => "plutus:v1",
            Script::PlutusV2(_) => "plutus:v2",
            Script::PlutusV3(_) => "plutus:v3",
        };
        Some(OgmiosScript {
            language,
            cbor: script.payload().to_owned(),
        })
    });

    Ok(OgmiosUtxo {
        transaction: TransactionId {
            id: utxo.tx_hash.clone(),
        },
        index: utxo.output_index,
        address: utxo.address.clone(),
        value,
        datum_hash: utxo.datum_hash.clone(),
        datum: utxo.datum.clone(),
        script,
    })
}
