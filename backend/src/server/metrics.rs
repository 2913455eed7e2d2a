//! Optional Prometheus metrics middleware.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

/// Request metrics under the `registration` namespace, served at `/metrics`.
pub fn build_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("registration")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("failed to configure metrics: {err}")))
}
