//! Kupo chain-indexer access.
//!
//! Defines the [`Indexer`] trait and provides an HTTP implementation
//! ([`HttpKupoClient`]) plus a test mock (`mock::MockIndexer`).

mod client;
#[cfg(test)]
pub mod mock;
mod pattern;
pub mod schema;

pub use client::HttpKupoClient;
pub use pattern::MatchQuery;
pub(crate) use pattern::ensure_hex;
pub use schema::{KupoDatum, KupoScript, KupoUtxo};

use async_trait::async_trait;

use crate::error::CoreError;

/// The Kupo endpoints the provider reads from.
///
/// Implementations return records exactly as the indexer reported them;
/// mapping to domain types happens in the provider.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Unspent outputs matching `query`.
    async fn matches(&self, query: &MatchQuery) -> Result<Vec<KupoUtxo>, CoreError>;

    /// Datum CBOR by hash. `None` when the indexer does not know the datum.
    async fn datum(&self, datum_hash: &str) -> Result<Option<KupoDatum>, CoreError>;

    /// Script by hash. `None` when the indexer does not know the script.
    async fn script(&self, script_hash: &str) -> Result<Option<KupoScript>, CoreError>;
}
