//! Localization metrics and observability.
//!
//! Counters for translation loads and key resolution. One instance lives in
//! each [`App`](crate::app::App); the headless binary prints its report.

use crate::i18n::InjectionReport;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one page session.
#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Translation documents fetched and parsed successfully
    documents_loaded: AtomicUsize,

    /// Translation fetches that failed (transport, status or parse)
    load_failures: AtomicUsize,

    /// Elements whose key resolved and was written
    keys_applied: AtomicUsize,

    /// Elements whose key had no value in the document
    keys_missing: AtomicUsize,

    /// Structured-metadata nodes left untouched because the payload was not JSON
    structured_failures: AtomicUsize,
}

impl LocalizationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_document_loaded(&self) {
        self.documents_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold an injector pass into the counters.
    pub fn record_injection(&self, report: &InjectionReport) {
        self.keys_applied.fetch_add(report.applied, Ordering::Relaxed);
        self.keys_missing.fetch_add(report.missing.len(), Ordering::Relaxed);
        self.structured_failures
            .fetch_add(report.failed.len(), Ordering::Relaxed);
    }

    pub fn documents_loaded(&self) -> usize {
        self.documents_loaded.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    pub fn keys_applied(&self) -> usize {
        self.keys_applied.load(Ordering::Relaxed)
    }

    pub fn keys_missing(&self) -> usize {
        self.keys_missing.load(Ordering::Relaxed)
    }

    pub fn structured_failures(&self) -> usize {
        self.structured_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let applied = self.keys_applied();
        let missing = self.keys_missing();
        let failed = self.structured_failures();
        let total_keys = applied + missing + failed;
        let key_coverage = if total_keys > 0 {
            (applied as f64 / total_keys as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            documents_loaded: self.documents_loaded(),
            load_failures: self.load_failures(),
            keys_applied: applied,
            keys_missing: missing,
            structured_failures: failed,
            key_coverage,
        }
    }
}

/// Snapshot of the localization counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub documents_loaded: usize,
    pub load_failures: usize,
    pub keys_applied: usize,
    pub keys_missing: usize,
    pub structured_failures: usize,

    /// Share of marked elements that were translated, as a percentage (0-100)
    pub key_coverage: f64,
}
