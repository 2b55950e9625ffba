//! Prometheus metrics for the HTTP surface.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "platesmith_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("platesmith_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "platesmith_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "platesmith_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"], // "missing_key", "invalid_key"
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    for metric in platesmith_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collapses job ids and filenames so metric cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    let assets = regex_lite::Regex::new(r"^(/internal)?/assets/[^/]+/[^/]+$").unwrap();
    if let Some(captures) = assets.captures(path) {
        let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        return format!("{}/assets/{{job_id}}/{{filename}}", prefix);
    }
    let uuid = regex_lite::Regex::new(r"[0-9a-fA-F]{32}").unwrap();
    uuid.replace_all(path, "{id}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_asset_paths() {
        assert_eq!(
            normalize_path("/assets/3f2a/front_layer_0_foil.png"),
            "/assets/{job_id}/{filename}"
        );
        assert_eq!(
            normalize_path("/internal/assets/3f2a/report.json"),
            "/internal/assets/{job_id}/{filename}"
        );
        assert_eq!(normalize_path("/parse"), "/parse");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/ping", "200"])
            .inc();
        let output = encode_metrics();
        assert!(output.contains("platesmith_http_requests_total"));
    }
}
