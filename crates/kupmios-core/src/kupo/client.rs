use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::decode::decode_json;
use crate::error::CoreError;
use crate::transport::{HttpEndpoint, HttpOptions};

use super::pattern::ensure_hex;
use super::schema::{KupoDatum, KupoScript, KupoUtxo};
use super::{Indexer, MatchQuery};

/// Kupo REST client over HTTP(S).
pub struct HttpKupoClient {
    endpoint: HttpEndpoint,
}

impl HttpKupoClient {
    /// Create a client for a Kupo base URL such as `http://127.0.0.1:1442`.
    pub fn new(connection: &str, options: &HttpOptions) -> Result<Self, CoreError> {
        Ok(Self {
            endpoint: HttpEndpoint::new(connection, options)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    async fn get_decoded<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, CoreError> {
        let body = self.endpoint.get_ok(path).await?;
        Ok(decode_json(&body, what)?)
    }
}

#[async_trait]
impl Indexer for HttpKupoClient {
    async fn matches(&self, query: &MatchQuery) -> Result<Vec<KupoUtxo>, CoreError> {
        let records: Vec<KupoUtxo> = self.get_decoded(&query.path(), "kupo matches").await?;
        debug!(kupo.pattern = query.pattern(), count = records.len(), "kupo matches");
        Ok(records)
    }

    async fn datum(&self, datum_hash: &str) -> Result<Option<KupoDatum>, CoreError> {
        ensure_hex(datum_hash, "datum hash")?;
        self.get_decoded(&format!("/datums/{datum_hash}"), "kupo datum")
            .await
    }

    async fn script(&self, script_hash: &str) -> Result<Option<KupoScript>, CoreError> {
        ensure_hex(script_hash, "script hash")?;
        self.get_decoded(&format!("/scripts/{script_hash}"), "kupo script")
            .await
    }
}
