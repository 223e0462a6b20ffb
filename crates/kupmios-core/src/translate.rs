//! Mapping of Ogmios protocol parameters onto [`ProtocolParameters`].

use crate::ogmios::OgmiosProtocolParameters;
use crate::types::{CostModel, CostModels, PlutusVersion, ProtocolParameters};

/// Pure and total: every input that decoded produces a value.
pub fn to_protocol_parameters(wire: &OgmiosProtocolParameters) -> ProtocolParameters {
    let cost_models = CostModels::from([
        (
            PlutusVersion::PlutusV1,
            indexed_cost_model(&wire.plutus_cost_models.plutus_v1),
        ),
        (
            PlutusVersion::PlutusV2,
            indexed_cost_model(&wire.plutus_cost_models.plutus_v2),
        ),
        (
            PlutusVersion::PlutusV3,
            indexed_cost_model(&wire.plutus_cost_models.plutus_v3),
        ),
    ]);

    ProtocolParameters {
        min_fee_a: wire.min_fee_coefficient,
        min_fee_b: wire.min_fee_constant.lovelace(),
        max_tx_size: wire.max_transaction_size.bytes,
        max_val_size: wire.max_value_size.bytes,
        key_deposit: wire.stake_credential_deposit.lovelace(),
        pool_deposit: wire.stake_pool_deposit.lovelace(),
        drep_deposit: wire.delegate_representative_deposit.lovelace(),
        gov_action_deposit: wire.governance_action_deposit.lovelace(),
        price_mem: wire.script_execution_prices.memory.to_f64(),
        price_step: wire.script_execution_prices.cpu.to_f64(),
        max_tx_ex_mem: wire.max_execution_units_per_transaction.memory,
        max_tx_ex_steps: wire.max_execution_units_per_transaction.cpu,
        coins_per_utxo_byte: wire.min_utxo_deposit_coefficient,
        collateral_percentage: wire.collateral_percentage,
        max_collateral_inputs: wire.max_collateral_inputs,
        min_fee_ref_script_cost_per_byte: wire.min_fee_reference_scripts.base,
        cost_models,
    }
}

fn indexed_cost_model(values: &[i64]) -> CostModel {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| (index.to_string(), *value))
        .collect()
}
