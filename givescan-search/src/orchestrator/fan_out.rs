//! Concurrent fan-out across every registered provider.
//!
//! All adapters run concurrently against the same query. Each one is
//! bounded by the per-provider timeout and raced against the scan's
//! cancellation token; a failure of any kind is logged and contributes
//! nothing. Output is concatenated in registration order, never in
//! completion order.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ScanError;
use crate::provider::{retain_geocoded, ProviderAdapter};
use crate::types::{NormalizedRecord, Query, Source};

/// Merged output of one fan-out.
#[derive(Debug, Clone, Default)]
pub struct FanOut {
    /// Geocoded records from every successful adapter, in registration order.
    pub records: Vec<NormalizedRecord>,
    /// Adapters that contributed at least one record.
    pub contributing: Vec<Source>,
    /// Adapters that failed, timed out or were cancelled.
    pub failed: Vec<Source>,
}

/// Query every adapter concurrently and merge their records.
///
/// Never fails: if every adapter fails the result is simply empty.
pub async fn fan_out(
    adapters: &[Box<dyn ProviderAdapter>],
    query: &Query,
    timeout: Duration,
    cancel: &CancellationToken,
) -> FanOut {
    let futures: Vec<_> = adapters
        .iter()
        .map(|adapter| async move {
            let source = adapter.source();
            if !adapter.is_enabled(query) {
                tracing::debug!(%source, "provider disabled for this query");
                return (source, Ok(Vec::new()));
            }
            let outcome = run_adapter(adapter.as_ref(), query, timeout, cancel).await;
            (source, outcome)
        })
        .collect();

    let outcomes = futures::future::join_all(futures).await;

    let mut merged = FanOut::default();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(records) => {
                let records = retain_geocoded(source, records);
                tracing::debug!(%source, count = records.len(), "provider returned records");
                if !records.is_empty() {
                    merged.contributing.push(source);
                }
                merged.records.extend(records);
            }
            Err(err) => {
                tracing::warn!(%source, error = %err, "provider query failed");
                merged.failed.push(source);
            }
        }
    }
    merged
}

async fn run_adapter(
    adapter: &dyn ProviderAdapter,
    query: &Query,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<NormalizedRecord>, ScanError> {
    let source = adapter.source();
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ScanError::Cancelled(format!("{source} cancelled"))),
        settled = tokio::time::timeout(timeout, adapter.fetch(query)) => match settled {
            Ok(result) => result,
            Err(_) => Err(ScanError::Timeout(format!(
                "{source} exceeded {}ms",
                timeout.as_millis()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::types::DEFAULT_CATEGORY;

    enum Behaviour {
        Records(Vec<NormalizedRecord>),
        Fail,
        Delay(Duration, Vec<NormalizedRecord>),
        Hang,
        Disabled,
    }

    struct MockProvider {
        source: Source,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        fn new(source: Source, behaviour: Behaviour) -> Self {
            Self {
                source,
                behaviour,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockProvider {
        fn source(&self) -> Source {
            self.source
        }

        fn is_enabled(&self, _query: &Query) -> bool {
            !matches!(self.behaviour, Behaviour::Disabled)
        }

        async fn fetch(&self, _query: &Query) -> Result<Vec<NormalizedRecord>, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Records(records) => Ok(records.clone()),
                Behaviour::Fail => Err(ScanError::Http("mock provider failure".into())),
                Behaviour::Delay(delay, records) => {
                    tokio::time::sleep(*delay).await;
                    Ok(records.clone())
                }
                Behaviour::Hang => {
                    std::future::pending::<()>().await;
                    Ok(Vec::new())
                }
                Behaviour::Disabled => Ok(vec![make_record("leaked", self.source)]),
            }
        }
    }

    fn make_record(id: &str, source: Source) -> NormalizedRecord {
        NormalizedRecord {
            id: id.into(),
            name: id.into(),
            address: String::new(),
            lat: 40.0,
            lng: -75.0,
            categories: vec![DEFAULT_CATEGORY.into()],
            website: String::new(),
            donation_url: String::new(),
            verified: false,
            source,
        }
    }

    fn make_query() -> Query {
        Query {
            lat: 40.0,
            lng: -75.0,
            radius_km: 10.0,
            q: None,
            category: None,
        }
    }

    fn ids(fan: &FanOut) -> Vec<&str> {
        fan.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn concatenates_in_registration_order_not_completion_order() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(MockProvider::new(
                Source::Osm,
                Behaviour::Delay(Duration::from_millis(60), vec![make_record("slow", Source::Osm)]),
            )),
            Box::new(MockProvider::new(
                Source::Google,
                Behaviour::Records(vec![make_record("fast", Source::Google)]),
            )),
        ];
        let fan = fan_out(
            &adapters,
            &make_query(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(ids(&fan), vec!["slow", "fast"]);
        assert_eq!(fan.contributing, vec![Source::Osm, Source::Google]);
        assert!(fan.failed.is_empty());
    }

    #[tokio::test]
    async fn failing_provider_is_isolated() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(MockProvider::new(Source::Osm, Behaviour::Fail)),
            Box::new(MockProvider::new(
                Source::Google,
                Behaviour::Records(vec![make_record("g1", Source::Google)]),
            )),
        ];
        let fan = fan_out(
            &adapters,
            &make_query(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(ids(&fan), vec!["g1"]);
        assert_eq!(fan.failed, vec![Source::Osm]);
    }

    #[tokio::test]
    async fn all_failing_yields_empty() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(MockProvider::new(Source::Osm, Behaviour::Fail)),
            Box::new(MockProvider::new(Source::Google, Behaviour::Fail)),
        ];
        let fan = fan_out(
            &adapters,
            &make_query(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert!(fan.records.is_empty());
        assert_eq!(fan.failed.len(), 2);
    }

    #[tokio::test]
    async fn hanging_provider_times_out_without_stalling_siblings() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(MockProvider::new(Source::Osm, Behaviour::Hang)),
            Box::new(MockProvider::new(
                Source::Google,
                Behaviour::Records(vec![make_record("g1", Source::Google)]),
            )),
        ];
        let started = std::time::Instant::now();
        let fan = fan_out(
            &adapters,
            &make_query(),
            Duration::from_millis(100),
            &CancellationToken::new(),
        )
        .await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(ids(&fan), vec!["g1"]);
        assert_eq!(fan.failed, vec![Source::Osm]);
    }

    #[tokio::test]
    async fn cancellation_settles_every_provider() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(MockProvider::new(Source::Osm, Behaviour::Hang)),
            Box::new(MockProvider::new(Source::Google, Behaviour::Hang)),
        ];
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let fan = fan_out(&adapters, &make_query(), Duration::from_secs(60), &cancel).await;
        assert!(fan.records.is_empty());
        assert_eq!(fan.failed, vec![Source::Osm, Source::Google]);
    }

    #[tokio::test]
    async fn non_finite_records_filtered_at_entry() {
        let mut bad = make_record("bad", Source::Osm);
        bad.lng = f64::NAN;
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![Box::new(MockProvider::new(
            Source::Osm,
            Behaviour::Records(vec![bad, make_record("good", Source::Osm)]),
        ))];
        let fan = fan_out(
            &adapters,
            &make_query(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(ids(&fan), vec!["good"]);
    }

    #[tokio::test]
    async fn every_provider_called_once() {
        let first = MockProvider::new(Source::Osm, Behaviour::Records(vec![]));
        let second = MockProvider::new(Source::Google, Behaviour::Fail);
        let (c1, c2) = (first.calls.clone(), second.calls.clone());
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![Box::new(first), Box::new(second)];
        let fan = fan_out(
            &adapters,
            &make_query(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
        assert!(fan.contributing.is_empty());
    }

    #[tokio::test]
    async fn disabled_provider_is_never_fetched() {
        let disabled = MockProvider::new(Source::ProPublica, Behaviour::Disabled);
        let calls = disabled.calls.clone();
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(MockProvider::new(
                Source::Osm,
                Behaviour::Records(vec![make_record("osm_1", Source::Osm)]),
            )),
            Box::new(disabled),
        ];
        let fan = fan_out(&adapters, &make_query(), Duration::from_secs(1), &CancellationToken::new()).await;
        assert_eq!(ids(&fan), vec!["osm_1"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(fan.failed.is_empty());
    }
}
