//! Prometheus metrics for the dapp shell.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Aggregated metrics for the shell and its pages.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "dapp_page_renders_total",
            "Page renders by page and outcome"
        );
        describe_histogram!(
            "dapp_page_render_duration_seconds",
            "Duration of each page render in seconds"
        );
        describe_counter!(
            "dapp_query_failures_total",
            "Failed queries reported to the query cache"
        );
        describe_counter!(
            "dapp_notifications_total",
            "Toasts raised by kind"
        );
        describe_counter!(
            "dapp_approvals_total",
            "Approval transactions by outcome"
        );
    }

    /// Record a finished page render.
    pub fn record_render(&self, page: &str, success: bool, duration: Duration) {
        let outcome = if success { "success" } else { "failure" };
        counter!("dapp_page_renders_total", "page" => page.to_string(), "outcome" => outcome)
            .increment(1);
        histogram!("dapp_page_render_duration_seconds", "page" => page.to_string())
            .record(duration.as_secs_f64());
    }

    pub fn record_query_failure(&self) {
        counter!("dapp_query_failures_total").increment(1);
    }

    pub fn record_notification(&self, kind: &'static str) {
        counter!("dapp_notifications_total", "kind" => kind).increment(1);
    }

    pub fn record_approval(&self, success: bool) {
        let outcome = if success { "confirmed" } else { "failed" };
        counter!("dapp_approvals_total", "outcome" => outcome).increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
