use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{EvalRedeemer, Utxo};

use super::schema::{OgmiosProtocolParameters, RewardAccountSummaries};
use super::NodeBridge;

/// A mock Ogmios backend for testing, populated via the builder pattern.
///
/// Anything not configured answers like a node with nothing to report:
/// protocol parameters fail with a remote error, reward summaries are `null`.
pub struct MockNodeBridge {
    protocol_parameters: Option<OgmiosProtocolParameters>,
    reward_summaries: RewardAccountSummaries,
    submit_outcome: Result<String, serde_json::Value>,
    evaluation: Vec<EvalRedeemer>,
    latency: Option<Duration>,
}

impl MockNodeBridge {
    pub fn builder() -> MockNodeBridgeBuilder {
        MockNodeBridgeBuilder {
            protocol_parameters: None,
            reward_summaries: None,
            submit_outcome: Ok(String::new()),
            evaluation: Vec::new(),
            latency: None,
        }
    }

    async fn respond(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

pub struct MockNodeBridgeBuilder {
    protocol_parameters: Option<OgmiosProtocolParameters>,
    reward_summaries: RewardAccountSummaries,
    submit_outcome: Result<String, serde_json::Value>,
    evaluation: Vec<EvalRedeemer>,
    latency: Option<Duration>,
}

impl MockNodeBridgeBuilder {
    pub fn with_protocol_parameters(mut self, params: OgmiosProtocolParameters) -> Self {
        self.protocol_parameters = Some(params);
        self
    }

    pub fn with_reward_summaries(mut self, summaries: RewardAccountSummaries) -> Self {
        self.reward_summaries = summaries;
        self
    }

    pub fn with_submit_result(mut self, tx_id: &str) -> Self {
        self.submit_outcome = Ok(tx_id.to_owned());
        self
    }

    pub fn with_submit_error(mut self, error: serde_json::Value) -> Self {
        self.submit_outcome = Err(error);
        self
    }

    pub fn with_evaluation(mut self, redeemers: Vec<EvalRedeemer>) -> Self {
        self.evaluation = redeemers;
        self
    }

    /// Delay every answer by `latency` (use with a paused clock).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn build(self) -> MockNodeBridge {
        MockNodeBridge {
            protocol_parameters: self.protocol_parameters,
            reward_summaries: self.reward_summaries,
            submit_outcome: self.submit_outcome,
            evaluation: self.evaluation,
            latency: self.latency,
        }
    }
}

#[async_trait]
impl NodeBridge for MockNodeBridge {
    async fn protocol_parameters(&self) -> Result<OgmiosProtocolParameters, CoreError> {
        self.respond().await;
        self.protocol_parameters.clone().ok_or_else(|| {
            CoreError::Remote(serde_json::json!({ "code": 2001, "message": "unavailable in era" }))
        })
    }

    async fn reward_account_summaries(
        &self,
        _reward_address: &str,
    ) -> Result<RewardAccountSummaries, CoreError> {
        self.respond().await;
        Ok(self.reward_summaries.clone())
    }

    async fn submit_transaction(&self, _cbor: &str) -> Result<String, CoreError> {
        self.respond().await;
        self.submit_outcome
            .clone()
            .map_err(CoreError::Remote)
    }

    async fn evaluate_transaction(
        &self,
        _cbor: &str,
        _additional_utxos: &[Utxo],
    ) -> Result<Vec<EvalRedeemer>, CoreError> {
        self.respond().await;
        Ok(self.evaluation.clone())
    }
}
