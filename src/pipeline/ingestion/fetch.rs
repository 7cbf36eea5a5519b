use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::cache::FetchCache;
use super::raw_table::RawTable;
use super::source::SourceDescriptor;
use crate::app::ports::HttpClientPort;
use crate::error::{FeedError, Result};
use crate::metrics::FetchMetrics;

/// Retrieve a feed and parse it into a raw table.
///
/// Unreachable hosts, non-2xx responses and bodies that are not CSV are
/// `FeedError::Fetch`; a missing expected column is `FeedError::Schema`.
/// There is no retry.
pub fn fetch(http: &dyn HttpClientPort, source: &SourceDescriptor) -> Result<RawTable> {
    let span = tracing::info_span!("fetch", feed = %source.name);
    let _enter = span.enter();

    let started = Instant::now();
    match fetch_and_parse(http, source) {
        Ok((table, payload_bytes)) => {
            let elapsed = started.elapsed().as_secs_f64();
            FetchMetrics::record_request_success(&source.name, elapsed, payload_bytes);
            info!(
                rows = table.len(),
                bytes = payload_bytes,
                elapsed_secs = elapsed,
                "Fetched feed"
            );
            Ok(table)
        }
        Err(e) => {
            FetchMetrics::record_request_error(&source.name, e.kind());
            warn!(url = %source.url, "Fetch failed: {}", e);
            Err(e)
        }
    }
}

fn fetch_and_parse(
    http: &dyn HttpClientPort,
    source: &SourceDescriptor,
) -> Result<(RawTable, usize)> {
    let resp = http
        .get(&source.url)
        .map_err(|reason| FeedError::fetch(&source.url, reason))?;
    if !resp.is_success() {
        return Err(FeedError::fetch(
            &source.url,
            format!("HTTP status {}", resp.status),
        ));
    }
    debug!(content_type = %resp.content_type, "Response received");

    let table = RawTable::from_csv(resp.bytes.as_slice()).map_err(|e| {
        FeedError::fetch(&source.url, format!("response is not valid CSV: {}", e))
    })?;
    if table.headers.iter().all(|h| h.is_empty()) {
        return Err(FeedError::fetch(&source.url, "response has no header row"));
    }
    table.require_columns(&source.name, source.required_columns.as_slice())?;

    Ok((table, resp.bytes.len()))
}

/// Like [`fetch`], but serves a fresh table from `cache` when one exists and
/// stores newly fetched tables in it. Failed fetches are never cached.
pub fn fetch_cached(
    http: &dyn HttpClientPort,
    source: &SourceDescriptor,
    cache: &FetchCache,
) -> Result<Arc<RawTable>> {
    if let Some(table) = cache.get_fresh(source, Instant::now()) {
        FetchMetrics::record_cache_hit(&source.name);
        debug!(feed = %source.name, "Serving feed from cache");
        return Ok(table);
    }
    FetchMetrics::record_cache_miss(&source.name);

    let fetched_at = Instant::now();
    let table = Arc::new(fetch(http, source)?);
    cache.store(source, Arc::clone(&table), fetched_at);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpGetResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StaticHttp {
        status: u16,
        body: &'static str,
        calls: AtomicUsize,
    }

    impl StaticHttp {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl HttpClientPort for StaticHttp {
        fn get(&self, _url: &str) -> std::result::Result<HttpGetResult, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpGetResult {
                status: self.status,
                bytes: self.body.as_bytes().to_vec(),
                content_type: "text/csv".to_string(),
            })
        }
    }

    struct DownHttp;

    impl HttpClientPort for DownHttp {
        fn get(&self, url: &str) -> std::result::Result<HttpGetResult, String> {
            Err(format!("connection refused: {}", url))
        }
    }

    const STATES: &str = "date,state,fips,cases,deaths\n2020-03-01,Washington,53,10,1\n";

    fn states_source() -> SourceDescriptor {
        SourceDescriptor::us_states("http://example.test/us-states.csv")
    }

    #[test]
    fn fetches_and_parses_csv() {
        let http = StaticHttp::new(200, STATES);
        let table = fetch(&http, &states_source()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][1], "Washington");
    }

    #[test]
    fn unreachable_source_is_fetch_error() {
        let err = fetch(&DownHttp, &states_source()).unwrap_err();
        assert!(matches!(err, FeedError::Fetch { .. }));
    }

    #[test]
    fn non_success_status_is_fetch_error() {
        let http = StaticHttp::new(404, "not found");
        let err = fetch(&http, &states_source()).unwrap_err();
        match err {
            FeedError::Fetch { reason, .. } => assert!(reason.contains("404")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_column_is_schema_error() {
        let http = StaticHttp::new(200, "date,state,cases\n2020-03-01,Washington,10\n");
        let err = fetch(&http, &states_source()).unwrap_err();
        assert!(matches!(err, FeedError::Schema { .. }));
    }

    #[test]
    fn empty_body_is_fetch_error() {
        let http = StaticHttp::new(200, "");
        let err = fetch(&http, &states_source()).unwrap_err();
        assert!(matches!(err, FeedError::Fetch { .. }));
    }

    #[test]
    fn cached_fetch_hits_network_once_while_fresh() {
        let http = StaticHttp::new(200, STATES);
        let cache = FetchCache::new(Duration::from_secs(60));
        let first = fetch_cached(&http, &states_source(), &cache).unwrap();
        let second = fetch_cached(&http, &states_source(), &cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_fetch_refetches_once_stale() {
        let http = StaticHttp::new(200, STATES);
        let cache = FetchCache::new(Duration::from_millis(5));
        let first = fetch_cached(&http, &states_source(), &cache).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let second = fetch_cached(&http, &states_source(), &cache).unwrap();
        assert_eq!(http.calls.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let http = StaticHttp::new(500, "oops");
        let cache = FetchCache::new(Duration::from_secs(60));
        assert!(fetch_cached(&http, &states_source(), &cache).is_err());
        assert!(cache.is_empty());
    }
}
