use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, trace};

use crate::decode::{decode_json, decode_value};
use crate::error::CoreError;
use crate::transport::{status_error, HttpEndpoint, HttpOptions};
use crate::types::{EvalRedeemer, Utxo};

use super::protocol::{rpc_outcome, JsonRpcRequest, JsonRpcResponse};
use super::schema::{
    to_ogmios_utxo, OgmiosProtocolParameters, OgmiosUtxo, RedeemerBudget,
    RewardAccountSummaries, SubmitResult, TransactionCbor,
};
use super::NodeBridge;

/// Ogmios JSON-RPC client over HTTP(S).
pub struct HttpOgmiosClient {
    endpoint: HttpEndpoint,
    next_id: AtomicU64,
}

impl HttpOgmiosClient {
    /// Create a client for an Ogmios base URL such as `http://127.0.0.1:1337`.
    pub fn new(connection: &str, options: &HttpOptions) -> Result<Self, CoreError> {
        Ok(Self {
            endpoint: HttpEndpoint::new(connection, options)?,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    async fn rpc_call<P, R>(&self, method: &str, params: P) -> Result<R, CoreError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(ogmios.id = id, ogmios.method = method, "ogmios call");
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let (status, body) = self.endpoint.post_json("", &request).await?;

        // Ogmios answers JSON-RPC errors with non-2xx statuses, so the status
        // only matters when the body is not an envelope at all.
        let envelope: JsonRpcResponse =
            match decode_json(&body, &format!("ogmios {method} envelope")) {
                Ok(envelope) => envelope,
                Err(_) if !status.is_success() => {
                    return Err(status_error(self.endpoint.url(""), status, body));
                }
                Err(e) => return Err(e.into()),
            };
        trace!(
            ogmios.id = id,
            ogmios.method = %envelope.method,
            ogmios.response_id = ?envelope.id,
            "ogmios envelope"
        );

        let result = rpc_outcome(method, envelope)?;
        Ok(decode_value(result, &format!("ogmios {method} result"))?)
    }
}

#[async_trait]
impl NodeBridge for HttpOgmiosClient {
    async fn protocol_parameters(&self) -> Result<OgmiosProtocolParameters, CoreError> {
        self.rpc_call("queryLedgerState/protocolParameters", json!({}))
            .await
    }

    async fn reward_account_summaries(
        &self,
        reward_address: &str,
    ) -> Result<RewardAccountSummaries, CoreError> {
        self.rpc_call(
            "queryLedgerState/rewardAccountSummaries",
            json!({ "keys": [reward_address] }),
        )
        .await
    }

    async fn submit_transaction(&self, cbor: &str) -> Result<String, CoreError> {
        let result: SubmitResult = self
            .rpc_call(
                "submitTransaction",
                json!({ "transaction": TransactionCbor { cbor } }),
            )
            .await?;
        Ok(result.transaction.id)
    }

    async fn evaluate_transaction(
        &self,
        cbor: &str,
        additional_utxos: &[Utxo],
    ) -> Result<Vec<EvalRedeemer>, CoreError> {
        let additional: Vec<OgmiosUtxo> = additional_utxos
            .iter()
            .map(to_ogmios_utxo)
            .collect::<Result<_, _>>()?;
        let budgets: Vec<RedeemerBudget> = self
            .rpc_call(
                "evaluateTransaction",
                json!({
                    "transaction": TransactionCbor { cbor },
                    "additionalUtxo": additional,
                }),
            )
            .await?;
        Ok(budgets.into_iter().map(EvalRedeemer::from).collect())
    }
}

// Seeded from wall-clock millis so ids from successive processes rarely
// collide in bridge logs.
fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}
