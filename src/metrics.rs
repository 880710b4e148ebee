use std::sync::OnceLock;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Repeated calls share one recorder.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            // Pre-register so series appear before the first event.
            counter!("guesses_placed_total").absolute(0);
            counter!("guesses_resolved_total", "result" => "win").absolute(0);
            counter!("guesses_resolved_total", "result" => "lose").absolute(0);
            counter!("price_fetch_failures_total").absolute(0);
            gauge!("storage_primary_enabled").set(0.0);

            handle
        })
        .clone()
}
