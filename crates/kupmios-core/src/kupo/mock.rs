use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CoreError, TransportError};

use super::schema::{KupoDatum, KupoScript, KupoUtxo};
use super::{Indexer, MatchQuery};

/// A mock Kupo backend for testing. Returns canned records keyed by request
/// path, populated via the builder pattern.
///
/// Unknown match paths answer with an empty list and unknown hashes with
/// `None`, as Kupo does.
pub struct MockIndexer {
    matches: Mutex<HashMap<String, VecDeque<Vec<KupoUtxo>>>>,
    datums: HashMap<String, String>,
    scripts: HashMap<String, KupoScript>,
    failing_hashes: HashSet<String>,
    match_latency: HashMap<String, Duration>,
    aux_latency: Option<Duration>,
    match_calls: AtomicUsize,
    aux_calls: AtomicUsize,
    aux_in_flight: AtomicUsize,
    aux_peak_in_flight: AtomicUsize,
}

impl MockIndexer {
    pub fn builder() -> MockIndexerBuilder {
        MockIndexerBuilder {
            matches: HashMap::new(),
            datums: HashMap::new(),
            scripts: HashMap::new(),
            failing_hashes: HashSet::new(),
            match_latency: HashMap::new(),
            aux_latency: None,
        }
    }

    pub fn match_calls(&self) -> usize {
        self.match_calls.load(Ordering::SeqCst)
    }

    /// Datum plus script lookups served so far.
    pub fn aux_calls(&self) -> usize {
        self.aux_calls.load(Ordering::SeqCst)
    }

    /// Highest number of datum/script lookups observed in flight at once.
    pub fn aux_peak_in_flight(&self) -> usize {
        self.aux_peak_in_flight.load(Ordering::SeqCst)
    }

    async fn track_aux(&self, hash: &str) -> Result<(), CoreError> {
        self.aux_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.aux_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.aux_peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.aux_latency {
            tokio::time::sleep(latency).await;
        }
        // Give sibling lookups a chance to start before this one finishes.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        self.aux_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_hashes.contains(hash) {
            return Err(TransportError::Status {
                url: format!("mock://kupo/{hash}"),
                status: 500,
                body: "mock failure".into(),
            }
            .into());
        }
        Ok(())
    }
}

pub struct MockIndexerBuilder {
    matches: HashMap<String, VecDeque<Vec<KupoUtxo>>>,
    datums: HashMap<String, String>,
    scripts: HashMap<String, KupoScript>,
    failing_hashes: HashSet<String>,
    match_latency: HashMap<String, Duration>,
    aux_latency: Option<Duration>,
}

impl MockIndexerBuilder {
    /// Answer `query` with `records` on every call.
    pub fn with_matches(self, query: &MatchQuery, records: Vec<KupoUtxo>) -> Self {
        self.with_match_sequence(query, vec![records])
    }

    /// Answer successive calls for `query` with successive responses. The
    /// last response repeats once the sequence is exhausted.
    pub fn with_match_sequence(mut self, query: &MatchQuery, responses: Vec<Vec<KupoUtxo>>) -> Self {
        self.matches.insert(query.path(), responses.into());
        self
    }

    pub fn with_datum(mut self, hash: &str, cbor: &str) -> Self {
        self.datums.insert(hash.to_owned(), cbor.to_owned());
        self
    }

    pub fn with_script(mut self, hash: &str, script: KupoScript) -> Self {
        self.scripts.insert(hash.to_owned(), script);
        self
    }

    /// Datum and script lookups for `hash` fail with a transport error.
    pub fn with_failing_hash(mut self, hash: &str) -> Self {
        self.failing_hashes.insert(hash.to_owned());
        self
    }

    /// Delay every answer to `query` by `latency`.
    pub fn with_match_latency(mut self, query: &MatchQuery, latency: Duration) -> Self {
        self.match_latency.insert(query.path(), latency);
        self
    }

    /// Delay every datum and script lookup by `latency`.
    pub fn with_aux_latency(mut self, latency: Duration) -> Self {
        self.aux_latency = Some(latency);
        self
    }

    pub fn build(self) -> MockIndexer {
        MockIndexer {
            matches: Mutex::new(self.matches),
            datums: self.datums,
            scripts: self.scripts,
            failing_hashes: self.failing_hashes,
            match_latency: self.match_latency,
            aux_latency: self.aux_latency,
            match_calls: AtomicUsize::new(0),
            aux_calls: AtomicUsize::new(0),
            aux_in_flight: AtomicUsize::new(0),
            aux_peak_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn matches(&self, query: &MatchQuery) -> Result<Vec<KupoUtxo>, CoreError> {
        self.match_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.match_latency.get(&query.path()) {
            tokio::time::sleep(*latency).await;
        }
        let mut matches = self.matches.lock().expect("mock mutex poisoned");
        let Some(responses) = matches.get_mut(&query.path()) else {
            return Ok(Vec::new());
        };
        if responses.len() > 1 {
            Ok(responses.pop_front().unwrap_or_default())
        } else {
            Ok(responses.front().cloned().unwrap_or_default())
        }
    }

    async fn datum(&self, datum_hash: &str) -> Result<Option<KupoDatum>, CoreError> {
        self.track_aux(datum_hash).await?;
        Ok(self.datums.get(datum_hash).map(|datum| KupoDatum {
            datum: datum.clone(),
        }))
    }

    async fn script(&self, script_hash: &str) -> Result<Option<KupoScript>, CoreError> {
        self.track_aux(script_hash).await?;
        Ok(self.scripts.get(script_hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[tokio::test]
    async fn match_sequence_advances_then_repeats_last() {
        let query = MatchQuery::for_transaction(TX_A).expect("valid hash");
        let indexer = MockIndexer::builder()
            .with_match_sequence(&query, vec![vec![], vec![kupo_utxo(TX_A, 0, 1)]])
            .build();

        assert!(indexer.matches(&query).await.expect("first").is_empty());
        assert_eq!(indexer.matches(&query).await.expect("second").len(), 1);
        assert_eq!(indexer.matches(&query).await.expect("third").len(), 1);
        assert_eq!(indexer.match_calls(), 3);
    }

    #[tokio::test]
    async fn unknown_lookups_are_empty() {
        let indexer = MockIndexer::builder().build();
        let query = MatchQuery::for_transaction(TX_B).expect("valid hash");
        assert!(indexer.matches(&query).await.expect("matches").is_empty());
        assert!(indexer.datum(DATUM_HASH).await.expect("datum").is_none());
        assert!(indexer.script(SCRIPT_HASH).await.expect("script").is_none());
    }

    #[tokio::test]
    async fn failing_hash_returns_error() {
        let indexer = MockIndexer::builder()
            .with_failing_hash(DATUM_HASH)
            .build();
        assert!(indexer.datum(DATUM_HASH).await.is_err());
    }
}
