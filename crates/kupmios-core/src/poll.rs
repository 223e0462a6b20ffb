//! Confirmation polling against the indexer.

use std::time::Duration;

use tracing::debug;

use crate::error::CoreError;
use crate::kupo::{Indexer, MatchQuery};

/// Re-query the outputs of `tx_hash` until at least one is visible.
///
/// The first query is issued immediately. After each empty answer the task
/// sleeps for the current delay, which starts at `check_interval` and doubles
/// every round. This never gives up on its own; callers bound it with
/// `tokio::time::timeout`. Query failures are returned as-is, not retried.
pub async fn await_visible(
    indexer: &dyn Indexer,
    tx_hash: &str,
    check_interval: Duration,
) -> Result<bool, CoreError> {
    let query = MatchQuery::for_transaction(tx_hash)?;
    if check_interval.is_zero() {
        return Err(CoreError::InvalidInput(
            "check interval must be non-zero".to_owned(),
        ));
    }
    let mut delay = check_interval;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let outputs = indexer.matches(&query).await?;
        if !outputs.is_empty() {
            debug!(tx_hash, attempt, outputs = outputs.len(), "transaction visible");
            return Ok(true);
        }

        debug!(
            tx_hash,
            attempt,
            retry_in_ms = delay.as_millis() as u64,
            "transaction not visible yet"
        );
        tokio::time::sleep(delay).await;
        delay = delay.saturating_mul(2);
    }
}
