//! The Kupo + Ogmios [`Provider`].

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::cache::AuxCache;
use crate::error::{CoreError, ProviderError};
use crate::kupo::{HttpKupoClient, Indexer, MatchQuery};
use crate::ogmios::schema::to_delegation;
use crate::ogmios::{HttpOgmiosClient, NodeBridge};
use crate::poll::await_visible;
use crate::provider::Provider;
use crate::resolve::AuxResolver;
use crate::transport::HttpOptions;
use crate::translate::to_protocol_parameters;
use crate::types::{
    split_unit, AddressOrCredential, Delegation, EvalRedeemer, OutRef, ProtocolParameters, Utxo,
};

// ==============================================================================
// Configuration
// ==============================================================================

#[derive(Debug, Clone)]
pub struct KupmiosConfig {
    /// Budget for every method except `await_tx` and `get_datum`.
    pub call_timeout: Duration,
    /// Overall budget for `await_tx`.
    pub await_tx_timeout: Duration,
    /// First `await_tx` back-off delay when the caller gives none.
    pub default_check_interval: Duration,
    /// Datum/script lookups allowed in flight per provider call.
    pub aux_concurrency: usize,
    /// Entries per datum/script cache; zero disables caching.
    pub cache_capacity: usize,
    pub http: HttpOptions,
}

impl Default for KupmiosConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            await_tx_timeout: Duration::from_secs(160),
            default_check_interval: Duration::from_secs(20),
            aux_concurrency: 16,
            cache_capacity: 1024,
            http: HttpOptions::default(),
        }
    }
}

impl KupmiosConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.call_timeout.is_zero() || self.await_tx_timeout.is_zero() {
            return Err(CoreError::Config("timeouts must be non-zero".to_owned()));
        }
        if self.default_check_interval.is_zero() {
            return Err(CoreError::Config(
                "default check interval must be non-zero".to_owned(),
            ));
        }
        if self.aux_concurrency == 0 {
            return Err(CoreError::Config(
                "aux concurrency must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

// ==============================================================================
// Provider
// ==============================================================================

/// Reads ledger state from a Kupo indexer and talks to the node through
/// Ogmios.
///
/// Cheap to share behind an `Arc`; all state is immutable apart from the
/// datum/script cache.
pub struct Kupmios {
    indexer: Arc<dyn Indexer>,
    bridge: Arc<dyn NodeBridge>,
    cache: AuxCache,
    config: KupmiosConfig,
}

impl Kupmios {
    /// Connect to `kupo_url` (e.g. `http://localhost:1442`) and `ogmios_url`
    /// (e.g. `http://localhost:1337`) with default settings.
    pub fn new(kupo_url: &str, ogmios_url: &str) -> Result<Self, CoreError> {
        Self::with_config(kupo_url, ogmios_url, KupmiosConfig::default())
    }

    pub fn with_config(
        kupo_url: &str,
        ogmios_url: &str,
        config: KupmiosConfig,
    ) -> Result<Self, CoreError> {
        let indexer = HttpKupoClient::new(kupo_url, &config.http)?;
        let bridge = HttpOgmiosClient::new(ogmios_url, &config.http)?;
        Self::with_backends(Arc::new(indexer), Arc::new(bridge), config)
    }

    /// Build on arbitrary backends, e.g. to share one indexer client.
    pub fn with_backends(
        indexer: Arc<dyn Indexer>,
        bridge: Arc<dyn NodeBridge>,
        config: KupmiosConfig,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            indexer,
            bridge,
            cache: AuxCache::new(config.cache_capacity),
            config,
        })
    }

    pub fn config(&self) -> &KupmiosConfig {
        &self.config
    }

    fn resolver(&self) -> AuxResolver<'_> {
        AuxResolver::new(
            self.indexer.as_ref(),
            &self.cache,
            self.config.aux_concurrency,
        )
    }

    async fn query_utxos(&self, query: &MatchQuery) -> Result<Vec<Utxo>, CoreError> {
        let records = self.indexer.matches(query).await?;
        self.resolver().resolve_all(records).await
    }

    async fn utxo_by_unit(&self, unit: &str) -> Result<Utxo, CoreError> {
        let (policy_id, asset_name) = split_unit(unit)?;
        let query = MatchQuery::for_unit(policy_id, asset_name)?;
        let mut records = self.indexer.matches(&query).await?;

        if records.len() > 1 {
            return Err(CoreError::AmbiguousUnit {
                unit: unit.to_owned(),
                count: records.len(),
            });
        }
        let record = records
            .pop()
            .ok_or_else(|| CoreError::Absent(format!("no unspent output holds unit {unit}")))?;
        self.resolver().resolve(record).await
    }

    async fn utxos_by_out_ref(&self, out_refs: &[OutRef]) -> Result<Vec<Utxo>, CoreError> {
        let mut seen = HashSet::new();
        let tx_hashes: Vec<&str> = out_refs
            .iter()
            .map(|out_ref| out_ref.tx_hash.as_str())
            .filter(|tx_hash| seen.insert(*tx_hash))
            .collect();
        debug!(
            out_refs = out_refs.len(),
            transactions = tx_hashes.len(),
            "querying outputs by reference"
        );

        let resolver = self.resolver();
        let budget = self.config.call_timeout;
        let per_transaction = tx_hashes.into_iter().map(|tx_hash| {
            let resolver = &resolver;
            within(budget, async move {
                let query = MatchQuery::for_transaction(tx_hash)?;
                let records = self.indexer.matches(&query).await?;
                resolver.resolve_all(records).await
            })
        });
        let found = try_join_all(per_transaction).await?;

        let wanted: HashSet<&OutRef> = out_refs.iter().collect();
        Ok(found
            .into_iter()
            .flatten()
            .filter(|utxo| wanted.contains(&utxo.out_ref()))
            .collect())
    }
}

/// Bound `fut` by `budget`, turning expiry into a timeout error.
async fn within<T, F>(budget: Duration, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .unwrap_or(Err(CoreError::Timeout { budget }))
}

/// Run one provider method: apply its budget (if any) and normalize the
/// failure into a [`ProviderError`].
async fn bounded<T, F>(
    method: &'static str,
    budget: Option<Duration>,
    fut: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    let outcome = match budget {
        Some(budget) => within(budget, fut).await,
        None => fut.await,
    };
    outcome.map_err(|cause| {
        warn!(method, error = %cause, "kupmios call failed");
        ProviderError::new(method, cause)
    })
}

#[async_trait]
impl Provider for Kupmios {
    async fn get_protocol_parameters(&self) -> Result<ProtocolParameters, ProviderError> {
        bounded(
            "get_protocol_parameters",
            Some(self.config.call_timeout),
            async {
                let wire = self.bridge.protocol_parameters().await?;
                Ok(to_protocol_parameters(&wire))
            },
        )
        .await
    }

    async fn get_utxos(&self, target: &AddressOrCredential) -> Result<Vec<Utxo>, ProviderError> {
        bounded("get_utxos", Some(self.config.call_timeout), async {
            let query = MatchQuery::for_target(target)?;
            self.query_utxos(&query).await
        })
        .await
    }

    async fn get_utxos_with_unit(
        &self,
        target: &AddressOrCredential,
        unit: &str,
    ) -> Result<Vec<Utxo>, ProviderError> {
        bounded("get_utxos_with_unit", Some(self.config.call_timeout), async {
            let (policy_id, asset_name) = split_unit(unit)?;
            let query =
                MatchQuery::for_target(target)?.with_asset_filter(policy_id, asset_name)?;
            self.query_utxos(&query).await
        })
        .await
    }

    async fn get_utxo_by_unit(&self, unit: &str) -> Result<Utxo, ProviderError> {
        bounded(
            "get_utxo_by_unit",
            Some(self.config.call_timeout),
            self.utxo_by_unit(unit),
        )
        .await
    }

    async fn get_utxos_by_out_ref(&self, out_refs: &[OutRef]) -> Result<Vec<Utxo>, ProviderError> {
        // Each transaction query carries its own budget.
        bounded("get_utxos_by_out_ref", None, self.utxos_by_out_ref(out_refs)).await
    }

    async fn get_delegation(&self, reward_address: &str) -> Result<Delegation, ProviderError> {
        bounded("get_delegation", Some(self.config.call_timeout), async {
            let summaries = self.bridge.reward_account_summaries(reward_address).await?;
            Ok(to_delegation(summaries))
        })
        .await
    }

    async fn get_datum(&self, datum_hash: &str) -> Result<String, ProviderError> {
        bounded("get_datum", None, async {
            self.resolver()
                .datum(datum_hash)
                .await?
                .ok_or_else(|| CoreError::Absent(format!("datum {datum_hash}")))
        })
        .await
    }

    async fn await_tx(
        &self,
        tx_hash: &str,
        check_interval: Option<Duration>,
    ) -> Result<bool, ProviderError> {
        let check_interval = check_interval.unwrap_or(self.config.default_check_interval);
        bounded(
            "await_tx",
            Some(self.config.await_tx_timeout),
            await_visible(self.indexer.as_ref(), tx_hash, check_interval),
        )
        .await
    }

    async fn submit_tx(&self, cbor: &str) -> Result<String, ProviderError> {
        bounded(
            "submit_tx",
            Some(self.config.call_timeout),
            self.bridge.submit_transaction(cbor),
        )
        .await
    }

    async fn evaluate_tx(
        &self,
        cbor: &str,
        additional_utxos: &[Utxo],
    ) -> Result<Vec<EvalRedeemer>, ProviderError> {
        bounded(
            "evaluate_tx",
            Some(self.config.call_timeout),
            self.bridge.evaluate_transaction(cbor, additional_utxos),
        )
        .await
    }
}
