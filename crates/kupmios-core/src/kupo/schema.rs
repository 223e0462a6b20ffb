//! Kupo wire records and their mapping onto domain types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cbor::apply_double_cbor_encoding;
use crate::error::CoreError;
use crate::types::{Assets, Script, Utxo, LOVELACE};

// ==============================================================================
// Matches
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatumKind {
    Hash,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KupoPoint {
    pub slot_no: u64,
    pub header_hash: String,
}

/// Output value: lovelace plus native assets keyed `policy.asset_name`
/// (or bare `policy` for an empty asset name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KupoValue {
    pub coins: u64,
    pub assets: BTreeMap<String, u64>,
}

/// One element of a `/matches` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KupoUtxo {
    pub transaction_index: u64,
    pub transaction_id: String,
    pub output_index: u32,
    pub address: String,
    pub value: KupoValue,
    // Nullable but required: `Option::deserialize` keeps serde from
    // defaulting a missing key to `None`.
    #[serde(deserialize_with = "Option::deserialize")]
    pub datum_hash: Option<String>,
    #[serde(default)]
    pub datum_type: Option<DatumKind>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub script_hash: Option<String>,
    pub created_at: KupoPoint,
    #[serde(deserialize_with = "Option::deserialize")]
    pub spent_at: Option<KupoPoint>,
}

impl KupoUtxo {
    /// Hash of an inline datum that has to be fetched separately.
    pub fn inline_datum_hash(&self) -> Option<&str> {
        match self.datum_type {
            Some(DatumKind::Inline) => self.datum_hash.as_deref(),
            _ => None,
        }
    }

    /// Build the domain value once auxiliary data has been resolved.
    pub fn into_utxo(self, datum: Option<String>, script_ref: Option<Script>) -> Utxo {
        let assets = to_assets(&self.value);
        let datum_hash = match self.datum_type {
            Some(DatumKind::Hash) => self.datum_hash,
            _ => None,
        };

        Utxo {
            tx_hash: self.transaction_id,
            output_index: self.output_index,
            address: self.address,
            assets,
            datum_hash,
            datum,
            script_ref,
        }
    }
}

pub fn to_assets(value: &KupoValue) -> Assets {
    let mut assets = Assets::new();
    assets.insert(LOVELACE.to_owned(), value.coins);
    for (key, quantity) in &value.assets {
        assets.insert(key.replacen('.', "", 1), *quantity);
    }
    assets
}

// ==============================================================================
// Datums and Scripts
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KupoDatum {
    pub datum: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptLanguage {
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "plutus:v1")]
    PlutusV1,
    #[serde(rename = "plutus:v2")]
    PlutusV2,
    #[serde(rename = "plutus:v3")]
    PlutusV3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KupoScript {
    pub language: ScriptLanguage,
    pub script: String,
}

impl KupoScript {
    pub fn into_script(self) -> Result<Script, CoreError> {
        Ok(match self.language {
            ScriptLanguage::Native => Script::Native(self.script),
            ScriptLanguage::PlutusV1 => Script::PlutusV1(apply_double_cbor_encoding(&self.script)?),
            ScriptLanguage::PlutusV2 => Script::PlutusV2(apply_double_cbor_encoding(&self.script)?),
            ScriptLanguage::PlutusV3 => Script::PlutusV3(apply_double_cbor_encoding(&self.script)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_json;
    use crate::test_util::*;

    #[test]
    fn decodes_kupo_match_record() {
        let body = serde_json::json!([kupo_match_json(TX_A, 1)]).to_string();
        let records: Vec<KupoUtxo> = decode_json(&body, "kupo matches").expect("should decode");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id, TX_A);
        assert_eq!(records[0].output_index, 1);
        assert_eq!(records[0].created_at.slot_no, 41_000_000);
        assert!(records[0].spent_at.is_none());
    }

    #[test]
    fn decoding_rejects_unknown_record_fields() {
        let mut record = kupo_match_json(TX_A, 0);
        record["unexpected"] = serde_json::json!(true);
        let body = serde_json::json!([record]).to_string();
        let err = decode_json::<Vec<KupoUtxo>>(&body, "kupo matches")
            .expect_err("unknown field must be rejected");
        assert!(err.message.contains("unexpected"));
    }

    #[test]
    fn decoding_requires_nullable_fields_to_be_present() {
        let mut record = kupo_match_json(TX_A, 0);
        record
            .as_object_mut()
            .expect("record is an object")
            .remove("script_hash");
        let body = serde_json::json!([record]).to_string();
        let err = decode_json::<Vec<KupoUtxo>>(&body, "kupo matches")
            .expect_err("missing field must be rejected");
        assert!(err.message.contains("script_hash"));
    }

    #[test]
    fn decoding_rejects_unknown_script_language() {
        let body = r#"{"language":"plutus:v9","script":"4e4d01"}"#;
        let err = decode_json::<KupoScript>(body, "kupo script").expect_err("must reject");
        assert!(err.message.contains("plutus:v9"));
    }

    #[test]
    fn record_maps_to_utxo_preserving_identity_and_assets() {
        let mut record = kupo_utxo(TX_A, 2, 2_000_000);
        record
            .value
            .assets
            .insert(format!("{POLICY}.{ASSET_NAME}"), 5);
        record.value.assets.insert(POLICY.to_owned(), 7);

        let utxo = record.clone().into_utxo(None, None);
        assert_eq!(utxo.tx_hash, record.transaction_id);
        assert_eq!(utxo.output_index, record.output_index);
        assert_eq!(utxo.address, record.address);
        assert_eq!(utxo.assets.len(), 3);
        assert_eq!(utxo.assets[LOVELACE], 2_000_000);
        assert_eq!(utxo.assets[&format!("{POLICY}{ASSET_NAME}")], 5);
        assert_eq!(utxo.assets[POLICY], 7);
    }

    #[test]
    fn datum_hash_kept_only_for_hash_kind() {
        let mut record = kupo_utxo(TX_A, 0, 1_000_000);
        record.datum_hash = Some(DATUM_HASH.to_owned());
        record.datum_type = Some(DatumKind::Hash);
        assert!(record.inline_datum_hash().is_none());
        let utxo = record.into_utxo(None, None);
        assert_eq!(utxo.datum_hash.as_deref(), Some(DATUM_HASH));
        assert!(utxo.datum.is_none());

        let mut record = kupo_utxo(TX_A, 0, 1_000_000);
        record.datum_hash = Some(DATUM_HASH.to_owned());
        record.datum_type = Some(DatumKind::Inline);
        assert_eq!(record.inline_datum_hash(), Some(DATUM_HASH));
        let utxo = record.into_utxo(Some("d87980".into()), None);
        assert!(utxo.datum_hash.is_none());
        assert_eq!(utxo.datum.as_deref(), Some("d87980"));
    }

    #[test]
    fn native_script_is_passed_through() {
        let script = KupoScript {
            language: ScriptLanguage::Native,
            script: "8200581c".into(),
        };
        assert_eq!(
            script.into_script().expect("native maps"),
            Script::Native("8200581c".into())
        );
    }

    #[test]
    fn plutus_script_is_double_wrapped() {
        let script = KupoScript {
            language: ScriptLanguage::PlutusV2,
            script: "4401020304".into(),
        };
        assert_eq!(
            script.into_script().expect("plutus maps"),
            Script::PlutusV2("454401020304".into())
        );
    }
}
