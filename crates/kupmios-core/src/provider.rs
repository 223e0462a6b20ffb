use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{
    AddressOrCredential, Delegation, EvalRedeemer, OutRef, ProtocolParameters, Utxo,
};

/// Backend-agnostic access to Cardano ledger state and transaction submission.
///
/// Every method fails with a [`ProviderError`] naming the method and carrying
/// the underlying cause, whatever backend produced it.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn get_protocol_parameters(&self) -> Result<ProtocolParameters, ProviderError>;

    /// Unspent outputs at an address, or at any address with a payment
    /// credential.
    async fn get_utxos(&self, target: &AddressOrCredential) -> Result<Vec<Utxo>, ProviderError>;

    /// [`get_utxos`](Self::get_utxos) restricted to outputs holding `unit`.
    async fn get_utxos_with_unit(
        &self,
        target: &AddressOrCredential,
        unit: &str,
    ) -> Result<Vec<Utxo>, ProviderError>;

    /// The single unspent output holding `unit`. Fails when no output or
    /// more than one output holds it.
    async fn get_utxo_by_unit(&self, unit: &str) -> Result<Utxo, ProviderError>;

    /// The unspent outputs among `out_refs`. Spent or unknown references are
    /// left out of the result.
    async fn get_utxos_by_out_ref(&self, out_refs: &[OutRef]) -> Result<Vec<Utxo>, ProviderError>;

    async fn get_delegation(&self, reward_address: &str) -> Result<Delegation, ProviderError>;

    /// Datum CBOR by hash. Fails when the datum is unknown.
    async fn get_datum(&self, datum_hash: &str) -> Result<String, ProviderError>;

    /// Resolve to `true` once outputs of `tx_hash` are visible. `None` uses
    /// the provider's default check interval.
    async fn await_tx(
        &self,
        tx_hash: &str,
        check_interval: Option<Duration>,
    ) -> Result<bool, ProviderError>;

    /// Submit a signed transaction (CBOR hex) and return its id.
    async fn submit_tx(&self, cbor: &str) -> Result<String, ProviderError>;

    /// Execution budgets for every redeemer in `cbor`.
    async fn evaluate_tx(
        &self,
        cbor: &str,
        additional_utxos: &[Utxo],
    ) -> Result<Vec<EvalRedeemer>, ProviderError>;
}
