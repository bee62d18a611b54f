//! Cross-zone loss ranking

use chrono::NaiveDate;

use crate::grouping::ZoneNames;
use crate::sparkline::{build_sparkline, Sparkline};
use crate::trend::classify_trend;
use crate::types::{RankingEntry, RankingResponse, Snapshot, Trend, ZoneId};

/// Per-zone figures feeding the ranking, before positions are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMetrics {
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub current_pct: f64,
    pub previous_pct: f64,
    pub trend: Trend,
    pub sparkline: Sparkline,
    pub total_loss_m3: f64,
    pub as_of: NaiveDate,
    pub reported_losses_m3: Option<f64>,
}

/// Derive a zone's metrics from its history (newest first)
///
/// Returns `None` for a zone without snapshots.
pub fn zone_metrics(
    zone_id: &str,
    history: &[&Snapshot],
    names: &ZoneNames<'_>,
    now: NaiveDate,
) -> Option<ZoneMetrics> {
    let latest = history.first()?;
    let current_pct = latest.nrw_pct;
    let previous_pct = history.get(1).map_or(current_pct, |prev| prev.nrw_pct);

    Some(ZoneMetrics {
        zone_id: zone_id.to_string(),
        zone_name: names.resolve(zone_id).to_string(),
        current_pct,
        previous_pct,
        trend: classify_trend(current_pct, previous_pct),
        sparkline: build_sparkline(history, now),
        total_loss_m3: latest.nrw_m3,
        as_of: latest.as_of,
        reported_losses_m3: latest.reported_losses_m3,
    })
}

/// Order zones by current loss, highest first, and number them from 1
///
/// Equal percentages are ordered by zone id so the result does not depend
/// on the order the metrics were produced in.
pub fn rank_zones(mut metrics: Vec<ZoneMetrics>) -> RankingResponse {
    metrics.sort_by(|a, b| {
        b.current_pct
            .total_cmp(&a.current_pct)
            .then_with(|| a.zone_id.cmp(&b.zone_id))
    });

    metrics
        .into_iter()
        .enumerate()
        .map(|(index, m)| RankingEntry {
            rank: index + 1,
            zone_id: m.zone_id,
            zone_name: m.zone_name,
            current_pct: m.current_pct,
            previous_pct: m.previous_pct,
            trend: m.trend,
            sparkline: m.sparkline,
            total_loss_m3: m.total_loss_m3,
            as_of: m.as_of,
            reported_losses_m3: m.reported_losses_m3,
            has_data: true,
        })
        .collect()
}
