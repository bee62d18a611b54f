//! One dashboard computation pass

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::grouping::{group_by_zone, latest_per_zone, ZoneNames};
use crate::kpi::summarize_latest;
use crate::ranking::{rank_zones, zone_metrics, ZoneMetrics};
use crate::types::{Dashboard, Snapshot, Zone};

/// Compute the ranking and fleet KPIs for `as_of`
///
/// Pure and deterministic: the same snapshots, zones and date always give
/// the same dashboard. Zones are processed in parallel; the final sort is
/// independent of which worker finishes first.
#[instrument(skip_all, fields(snapshots = snapshots.len(), zones = zones.len(), as_of = %as_of))]
pub fn compute_dashboard(snapshots: &[Snapshot], zones: &[Zone], as_of: NaiveDate) -> Dashboard {
    let names = ZoneNames::new(zones);
    let series = group_by_zone(snapshots, zones);

    let histories: Vec<(&str, &[&Snapshot])> = series
        .iter()
        .map(|(zone_id, history)| (*zone_id, history.as_slice()))
        .collect();

    let metrics: Vec<ZoneMetrics> = histories
        .par_iter()
        .filter_map(|&(zone_id, history)| zone_metrics(zone_id, history, &names, as_of))
        .collect();

    let kpis = summarize_latest(latest_per_zone(&series), &names);
    let ranking = rank_zones(metrics);

    debug!(
        ranked = ranking.len(),
        avg_nrw_pct = kpis.avg_nrw_pct,
        "Dashboard computed"
    );

    Dashboard {
        as_of,
        ranking,
        kpis,
    }
}
