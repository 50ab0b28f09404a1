//! Baseline store
//!
//! Site-keyed store of fitted baseline snapshots. Refitting swaps the whole
//! map; readers holding an `Arc<Baseline>` keep seeing the snapshot they
//! started with, so concurrent detection calls need no coordination.

use std::sync::Arc;

use parking_lot::RwLock;

use super::engine::{fit_baselines, BaselineSet};
use super::types::Baseline;
use crate::error::DetectionResult;
use crate::record::ConsumptionRecord;
use crate::site::Site;

#[derive(Debug, Default)]
pub struct BaselineStore {
    inner: RwLock<BaselineSet>,
}

impl BaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit fresh baselines from a historical dataset and replace every
    /// stored snapshot. Returns the number of fitted sites.
    pub fn refit(&self, records: &[ConsumptionRecord]) -> DetectionResult<usize> {
        let baselines = fit_baselines(records)?;
        let count = baselines.len();
        *self.inner.write() = baselines;
        Ok(count)
    }

    pub fn get(&self, site: &Site) -> Option<Arc<Baseline>> {
        self.inner.read().get(site).cloned()
    }

    /// Clone of the current site -> baseline map. Snapshots are `Arc`s,
    /// so this is cheap.
    pub fn snapshot(&self) -> BaselineSet {
        self.inner.read().clone()
    }

    pub fn is_fitted(&self) -> bool {
        !self.inner.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}
