//! Metrics/tracing hooks.
//!
//! This module purposefully avoids pulling heavy telemetry stacks; the binary
//! decides where events go by installing a subscriber.

use bagunion_core::report::PhaseReport;

#[cfg(feature = "tracing")]
pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::span!(tracing::Level::TRACE, "bagunion", event);
    let _entered = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_span(_event: &str, _key_values: &[(&str, String)]) { /* no-op */
}

/// Emit one finished phase as a metric span.
pub fn emit_phase(report: &PhaseReport) {
    emit_span(
        "phase_finished",
        &[
            ("phase", report.phase.clone()),
            ("elapsed_ms", report.elapsed_ms.to_string()),
            ("blocks_read", report.io.blocks_read.to_string()),
            ("blocks_written", report.io.blocks_written.to_string()),
        ],
    );
}
