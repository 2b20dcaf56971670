use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
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

/// `outcome` is one of `success`, `not_found`, `invalid_credentials`.
pub fn record_login(outcome: &'static str) {
    counter!("portal_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_payment_submitted(currency: &str) {
    counter!("portal_payments_submitted_total", "currency" => currency.to_string()).increment(1);
}

pub fn record_payment_decision(decision: &'static str) {
    counter!("portal_payment_decisions_total", "decision" => decision).increment(1);
}
