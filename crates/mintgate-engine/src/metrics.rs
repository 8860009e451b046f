//! # Engine Metrics
//!
//! In-process atomic counters. No exporter; callers read a
//! [`MetricsSnapshot`] and publish it however they like.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use mintgate_state::MintKind;

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    pub whitelist_mints: Arc<AtomicU64>,
    pub public_mints: Arc<AtomicU64>,
    pub gifts: Arc<AtomicU64>,
    pub assets_issued: Arc<AtomicU64>,
    pub releases: Arc<AtomicU64>,
    pub admin_updates: Arc<AtomicU64>,
    rejections: Arc<Mutex<BTreeMap<&'static str, u64>>>,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub whitelist_mints: u64,
    pub public_mints: u64,
    pub gifts: u64,
    pub assets_issued: u64,
    pub releases: u64,
    pub admin_updates: u64,
    /// Rejection counts keyed by error code.
    pub rejections: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    /// Sum of all rejections.
    pub fn total_rejections(&self) -> u64 {
        self.rejections.values().sum()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_mint(&self, kind: MintKind, quantity: u64) {
        let counter = match kind {
            MintKind::Whitelist => &self.whitelist_mints,
            MintKind::Public => &self.public_mints,
            MintKind::Gift => &self.gifts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.assets_issued.fetch_add(quantity, Ordering::Relaxed);
    }

    pub(crate) fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admin_update(&self) {
        self.admin_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self, code: &'static str) {
        *self.rejections.lock().entry(code).or_insert(0) += 1;
    }

    /// Rejections recorded under `code`.
    pub fn rejections(&self, code: &str) -> u64 {
        self.rejections.lock().get(code).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            whitelist_mints: self.whitelist_mints.load(Ordering::Relaxed),
            public_mints: self.public_mints.load(Ordering::Relaxed),
            gifts: self.gifts.load(Ordering::Relaxed),
            assets_issued: self.assets_issued.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            admin_updates: self.admin_updates.load(Ordering::Relaxed),
            rejections: self
                .rejections
                .lock()
                .iter()
                .map(|(code, n)| ((*code).to_string(), *n))
                .collect(),
        }
    }
}
