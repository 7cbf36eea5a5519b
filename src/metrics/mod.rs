//! Feed pipeline metrics
//!
//! Counters and histograms are emitted through the `metrics` facade. Nothing
//! here installs a recorder: a host process that wants the numbers installs
//! one, otherwise every call is a no-op.

/// Consistent naming: covid_feeds_{phase}_{metric_name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("covid_feeds_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("covid_feeds_", $phase, "_", $name)
    };
}

/// Metrics for remote fetches and the fetch cache.
pub struct FetchMetrics;

impl FetchMetrics {
    pub fn record_request_success(feed: &str, duration_secs: f64, payload_bytes: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "requests_success"),
            "feed" => feed.to_string()
        )
        .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "fetch", "request_duration_seconds"))
            .record(duration_secs);
        ::metrics::histogram!(phase_metric!(histogram, "fetch", "payload_bytes"))
            .record(payload_bytes as f64);
    }

    pub fn record_request_error(feed: &str, error_kind: &'static str) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "requests_error"),
            "feed" => feed.to_string(),
            "kind" => error_kind
        )
        .increment(1);
    }

    pub fn record_cache_hit(feed: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "cache_hits"),
            "feed" => feed.to_string()
        )
        .increment(1);
    }

    pub fn record_cache_miss(feed: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "fetch", "cache_misses"),
            "feed" => feed.to_string()
        )
        .increment(1);
    }
}

/// Metrics for the tidy-table transforms.
pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_rows_normalized(feed: &str, rows: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "normalize", "rows"),
            "feed" => feed.to_string()
        )
        .increment(rows as u64);
    }

    pub fn record_schema_error(feed: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "normalize", "schema_errors"),
            "feed" => feed.to_string()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_convention() {
        assert_eq!(
            phase_metric!(counter, "fetch", "cache_hits"),
            "covid_feeds_fetch_cache_hits_total"
        );
        assert_eq!(
            phase_metric!(histogram, "fetch", "payload_bytes"),
            "covid_feeds_fetch_payload_bytes"
        );
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        FetchMetrics::record_request_success("us_states", 0.1, 10);
        FetchMetrics::record_request_error("us_states", "fetch");
        FetchMetrics::record_cache_hit("us_states");
        FetchMetrics::record_cache_miss("us_states");
        NormalizeMetrics::record_rows_normalized("us_states", 3);
        NormalizeMetrics::record_schema_error("us_states");
    }
}
