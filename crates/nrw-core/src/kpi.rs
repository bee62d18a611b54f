//! Fleet-wide KPI aggregation over each zone's latest snapshot

use crate::balance::finite_or_zero;
use crate::grouping::ZoneNames;
use crate::types::{KpiSummary, Snapshot};

#[derive(Debug, Clone)]
struct Extreme {
    pct: f64,
    zone_id: String,
    zone_name: String,
}

/// Accumulator for the latest-per-zone KPI figures
///
/// Every zone counts equally in the average, regardless of its input
/// volume. Worst/best ties go to the lowest zone id, so the result does not
/// depend on insertion order.
#[derive(Debug, Clone, Default)]
pub struct KpiAccumulator {
    count: usize,
    pct_sum: f64,
    loss_sum: f64,
    worst: Option<Extreme>,
    best: Option<Extreme>,
}

impl KpiAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one zone's latest reading
    pub fn add(&mut self, zone_id: &str, zone_name: &str, nrw_pct: f64, nrw_m3: f64) {
        self.count += 1;
        self.pct_sum += nrw_pct;
        self.loss_sum += nrw_m3;

        let candidate = || Extreme {
            pct: nrw_pct,
            zone_id: zone_id.to_string(),
            zone_name: zone_name.to_string(),
        };

        let replaces_worst = match &self.worst {
            None => true,
            Some(w) => nrw_pct > w.pct || (nrw_pct == w.pct && zone_id < w.zone_id.as_str()),
        };
        if replaces_worst {
            self.worst = Some(candidate());
        }

        let replaces_best = match &self.best {
            None => true,
            Some(b) => nrw_pct < b.pct || (nrw_pct == b.pct && zone_id < b.zone_id.as_str()),
        };
        if replaces_best {
            self.best = Some(candidate());
        }
    }

    /// Summary so far; zeroed with `has_data = false` when nothing was added
    ///
    /// Sums that overflow are reported as 0.
    pub fn result(&self) -> KpiSummary {
        if self.count == 0 {
            return KpiSummary::default();
        }

        KpiSummary {
            avg_nrw_pct: finite_or_zero(self.pct_sum / self.count as f64),
            total_loss_m3: finite_or_zero(self.loss_sum),
            worst_zone_name: self.worst.as_ref().map(|w| w.zone_name.clone()),
            best_zone_name: self.best.as_ref().map(|b| b.zone_name.clone()),
            zone_count: self.count,
            has_data: true,
        }
    }
}

/// Summarize each zone's latest snapshot into fleet KPIs
pub fn summarize_latest<'a>(
    latest: impl IntoIterator<Item = (&'a str, &'a Snapshot)>,
    names: &ZoneNames<'_>,
) -> KpiSummary {
    let mut acc = KpiAccumulator::new();
    for (zone_id, snapshot) in latest {
        acc.add(
            zone_id,
            names.resolve(zone_id),
            snapshot.nrw_pct,
            snapshot.nrw_m3,
        );
    }
    acc.result()
}
