//! Counters behind the /health endpoint.
//! Updated by the conversion handler.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct HealthState {
    /// Conversions answered with a result.
    pub conversions_ok: AtomicU64,
    /// Conversions answered with an error.
    pub conversions_rejected: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_ok(&self) {
        self.conversions_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.conversions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn conversions_ok(&self) -> u64 {
        self.conversions_ok.load(Ordering::Relaxed)
    }

    pub fn conversions_rejected(&self) -> u64 {
        self.conversions_rejected.load(Ordering::Relaxed)
    }
}
