use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const BILLS_SUBMITTED_TOTAL: &str = "bills_submitted_total";
pub const BILL_SUBMISSION_FAILURES_TOTAL: &str = "bill_submission_failures_total";

/// Install the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
            metrics::describe_counter!(BILLS_SUBMITTED_TOTAL, "Bills accepted by the backend");
            metrics::describe_counter!(
                BILL_SUBMISSION_FAILURES_TOTAL,
                "Bill submissions that failed, by reason"
            );
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_submission(grand_total: f64) {
    metrics::counter!(BILLS_SUBMITTED_TOTAL).increment(1);
    metrics::histogram!("bill_grand_total").record(grand_total);
}

pub fn record_submission_failure(reason: &'static str) {
    metrics::counter!(BILL_SUBMISSION_FAILURES_TOTAL, "reason" => reason).increment(1);
}
