//! Health sink seam and the in-process sink behind `/ops/health`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use tally_core::error::{Result, TallyError};
use tally_core::{HealthReport, LoadMetric};

/// Consumer of health reports and load metrics (cluster manager side).
///
/// The sink owns sequence numbering: `report_health` returns the sequence
/// number it assigned.
#[async_trait]
pub trait HealthSink: Send + Sync {
    async fn report_health(&self, report: HealthReport) -> Result<u64>;
    async fn report_load(&self, metrics: &[LoadMetric]) -> Result<()>;
}

/// Point-in-time copy of what the in-process sink holds.
#[derive(Debug, Clone, Default)]
pub struct SinkSnapshot {
    pub reports: Vec<HealthReport>,
    pub load: Vec<LoadMetric>,
}

/// In-process sink: keeps the latest report per (property, sub_property) and
/// the latest load metrics.
pub struct InMemoryHealthSink {
    seq: AtomicU64,
    reports: DashMap<(String, String), HealthReport>,
    load: Mutex<Vec<LoadMetric>>,
}

impl Default for InMemoryHealthSink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHealthSink {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(1),
            reports: DashMap::new(),
            load: Mutex::new(Vec::new()),
        }
    }

    pub fn latest(&self, property: &str, sub_property: &str) -> Option<HealthReport> {
        self.reports
            .get(&(property.to_string(), sub_property.to_string()))
            .map(|r| r.value().clone())
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        let mut reports: Vec<HealthReport> =
            self.reports.iter().map(|r| r.value().clone()).collect();
        reports.sort_by_key(|r| r.sequence_number);
        let load = match self.load.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        SinkSnapshot { reports, load }
    }
}

#[async_trait]
impl HealthSink for InMemoryHealthSink {
    async fn report_health(&self, mut report: HealthReport) -> Result<u64> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        report.sequence_number = Some(seq);
        let key = (report.property.clone(), report.sub_property.clone());
        self.reports.insert(key, report);
        Ok(seq)
    }

    async fn report_load(&self, metrics: &[LoadMetric]) -> Result<()> {
        let mut g = self
            .load
            .lock()
            .map_err(|_| TallyError::SinkUnavailable("load slot poisoned".into()))?;
        *g = metrics.to_vec();
        Ok(())
    }
}
