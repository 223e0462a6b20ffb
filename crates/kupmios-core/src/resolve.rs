//! Auxiliary-data resolution: turning Kupo match records into [`Utxo`]s by
//! fetching inline datums and reference scripts.
//!
//! Lookups for one batch run concurrently under a shared permit pool, go
//! through the [`AuxCache`] first, and fail the whole batch on the first
//! error. A hash the indexer does not know resolves to `None`.

use futures::future::try_join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::cache::AuxCache;
use crate::error::CoreError;
use crate::kupo::{Indexer, KupoUtxo};
use crate::types::{Script, Utxo};

pub struct AuxResolver<'a> {
    indexer: &'a dyn Indexer,
    cache: &'a AuxCache,
    permits: Semaphore,
}

impl<'a> AuxResolver<'a> {
    /// `concurrency` bounds in-flight datum and script lookups; zero is
    /// treated as one.
    pub fn new(indexer: &'a dyn Indexer, cache: &'a AuxCache, concurrency: usize) -> Self {
        Self {
            indexer,
            cache,
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    /// Resolve every record, preserving input order.
    pub async fn resolve_all(&self, records: Vec<KupoUtxo>) -> Result<Vec<Utxo>, CoreError> {
        let count = records.len();
        let utxos = try_join_all(records.into_iter().map(|record| self.resolve(record))).await?;
        debug!(count, "resolved utxo auxiliary data");
        Ok(utxos)
    }

    pub async fn resolve(&self, record: KupoUtxo) -> Result<Utxo, CoreError> {
        let datum_hash = record.inline_datum_hash().map(str::to_owned);
        let script_hash = record.script_hash.clone();

        let datum = async {
            match &datum_hash {
                Some(hash) => self.datum(hash).await,
                None => Ok(None),
            }
        };
        let script = async {
            match &script_hash {
                Some(hash) => self.script(hash).await,
                None => Ok(None),
            }
        };
        let (datum, script_ref) = futures::try_join!(datum, script)?;

        Ok(record.into_utxo(datum, script_ref))
    }

    /// Datum CBOR by hash, from the cache or the indexer.
    pub async fn datum(&self, hash: &str) -> Result<Option<String>, CoreError> {
        if let Some(cached) = self.cache.get_datum(hash).await {
            return Ok(Some(cached));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .expect("semaphore is never closed");

        let datum = self.indexer.datum(hash).await?.map(|found| found.datum);
        if let Some(datum) = &datum {
            self.cache.insert_datum(hash, datum.clone()).await;
        }
        Ok(datum)
    }

    /// Reference script by hash, from the cache or the indexer. Plutus
    /// payloads come back double CBOR-wrapped.
    pub async fn script(&self, hash: &str) -> Result<Option<Script>, CoreError> {
        if let Some(cached) = self.cache.get_script(hash).await {
            return Ok(Some(cached));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .expect("semaphore is never closed");

        let script = match self.indexer.script(hash).await? {
            Some(found) => Some(found.into_script()?),
            None => None,
        };
        if let Some(script) = &script {
            self.cache.insert_script(hash, script.clone()).await;
        }
        Ok(script)
    }
}
