use lazy_static::lazy_static;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

use crate::ChainVerdict;

lazy_static! {
    static ref CHAINPROBE_CHECKS_TOTAL: IntCounter = register_int_counter!(
        "chainprobe_checks_total",
        "chain checks that completed a handshake and produced a verdict"
    )
    .unwrap();
    static ref CHAINPROBE_CHECK_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "chainprobe_check_errors_total",
        "chain checks that failed before a verdict could be produced"
    )
    .unwrap();
    static ref CHAINPROBE_CHAINS_VALID_TOTAL: IntCounter = register_int_counter!(
        "chainprobe_chains_valid_total",
        "verdicts where the presented chain validated"
    )
    .unwrap();
    static ref CHAINPROBE_CHAINS_INVALID_TOTAL: IntCounter = register_int_counter!(
        "chainprobe_chains_invalid_total",
        "verdicts where the presented chain failed validation"
    )
    .unwrap();
}

/// Records a completed check and its verdict.
pub fn record_verdict(verdict: &ChainVerdict) {
    CHAINPROBE_CHECKS_TOTAL.inc();
    match verdict {
        ChainVerdict::Valid => CHAINPROBE_CHAINS_VALID_TOTAL.inc(),
        ChainVerdict::Invalid(_) => CHAINPROBE_CHAINS_INVALID_TOTAL.inc(),
    }
}

/// Records a check that errored before producing a verdict.
pub fn record_error() {
    CHAINPROBE_CHECK_ERRORS_TOTAL.inc();
}

/// Renders all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
