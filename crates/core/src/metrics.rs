//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket intake (accepted and rejected submissions)
//! - Persistence (writes per backend, outcome and latency)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Intake Metrics
// =============================================================================

/// Tickets accepted into the table.
pub static TICKETS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_tickets_submitted_total",
        "Total tickets accepted from the submission form",
    )
    .unwrap()
});

/// Submissions rejected by validation, by the first missing field.
pub static SUBMISSIONS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketdesk_submissions_rejected_total",
            "Total submissions rejected for a missing required field",
        ),
        &["field"], // "name", "title", "description", "business_case"
    )
    .unwrap()
});

// =============================================================================
// Persistence Metrics
// =============================================================================

/// Persist attempts by backend and result.
pub static PERSIST_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketdesk_persist_total",
            "Total table writes by backend and result",
        ),
        &["backend", "result"], // result: "ok", "conflict", "unreachable", ...
    )
    .unwrap()
});

/// Persist duration in seconds, probe included.
pub static PERSIST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketdesk_persist_duration_seconds",
            "Duration of a table write including the precondition probe",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["backend"],
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Intake
        Box::new(TICKETS_SUBMITTED.clone()),
        Box::new(SUBMISSIONS_REJECTED.clone()),
        // Persistence
        Box::new(PERSIST_TOTAL.clone()),
        Box::new(PERSIST_DURATION.clone()),
    ]
}
