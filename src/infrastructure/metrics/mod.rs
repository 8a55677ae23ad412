//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Presigned upload URLs issued, by media kind
//! - Bulk upload analysis results, by outcome

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "catalog_admin";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Presigned upload URLs issued
pub static UPLOADS_PRESIGNED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("uploads_presigned_total", "Presigned upload URLs issued").namespace(NAMESPACE),
        &["kind"], // "image", "audio"
    )
    .expect("Failed to create UPLOADS_PRESIGNED_TOTAL metric")
});

/// Bulk upload items analyzed
pub static BULK_ITEMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bulk_upload_items_total", "Bulk upload items analyzed").namespace(NAMESPACE),
        &["outcome"], // "ready", "duplicate", "duplicate_in_batch", "rejected"
    )
    .expect("Failed to create BULK_ITEMS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(UPLOADS_PRESIGNED_TOTAL.clone()))
        .expect("Failed to register UPLOADS_PRESIGNED_TOTAL");
    registry
        .register(Box::new(BULK_ITEMS_TOTAL.clone()))
        .expect("Failed to register BULK_ITEMS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn record_presigned_upload(kind: &str) {
    UPLOADS_PRESIGNED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_bulk_item(outcome: &str) {
    BULK_ITEMS_TOTAL.with_label_values(&[outcome]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*UPLOADS_PRESIGNED_TOTAL;
        let _ = &*BULK_ITEMS_TOTAL;
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics().unwrap();
        assert!(metrics.contains("catalog_admin_http_requests_total"));
    }

    #[test]
    fn test_record_upload_and_bulk() {
        record_presigned_upload("audio");
        record_bulk_item("duplicate");
        let metrics = gather_metrics().unwrap();
        assert!(metrics.contains("catalog_admin_uploads_presigned_total"));
        assert!(metrics.contains("outcome=\"duplicate\""));
    }
}
