//! Ogmios node-bridge access.
//!
//! Defines the [`NodeBridge`] trait and provides an HTTP JSON-RPC
//! implementation ([`HttpOgmiosClient`]) plus a test mock
//! (`mock::MockNodeBridge`).

mod client;
#[cfg(test)]
pub mod mock;
mod protocol;
pub mod schema;

pub use client::HttpOgmiosClient;
pub use schema::{OgmiosProtocolParameters, RewardAccountSummaries};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{EvalRedeemer, Utxo};

/// The Ogmios JSON-RPC methods the provider needs.
///
/// A JSON-RPC `error` object is returned as [`CoreError::Remote`] carrying
/// the object unchanged.
#[async_trait]
pub trait NodeBridge: Send + Sync {
    /// `queryLedgerState/protocolParameters`
    async fn protocol_parameters(&self) -> Result<OgmiosProtocolParameters, CoreError>;

    /// `queryLedgerState/rewardAccountSummaries` for a single reward address.
    async fn reward_account_summaries(
        &self,
        reward_address: &str,
    ) -> Result<RewardAccountSummaries, CoreError>;

    /// `submitTransaction`; returns the transaction id.
    async fn submit_transaction(&self, cbor: &str) -> Result<String, CoreError>;

    /// `evaluateTransaction` with extra UTxOs the node may not know about.
    async fn evaluate_transaction(
        &self,
        cbor: &str,
        additional_utxos: &[Utxo],
    ) -> Result<Vec<EvalRedeemer>, CoreError>;
}
