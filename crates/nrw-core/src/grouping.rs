//! Per-zone time series: grouping snapshots and resolving zone names

use std::collections::{BTreeMap, HashMap};

use crate::types::{Snapshot, Zone};

/// Label used when a snapshot references a zone missing from the directory
pub const UNKNOWN_ZONE_NAME: &str = "Unknown";

/// Snapshots per zone, newest first, keyed (and iterated) by zone id
pub type ZoneSeries<'a> = BTreeMap<&'a str, Vec<&'a Snapshot>>;

/// Group snapshots by zone and order each group by `as_of`, newest first
///
/// Every directory zone gets an entry, possibly empty. Zones that only
/// appear in snapshots are included as well. Snapshots sharing a date keep
/// their input order.
pub fn group_by_zone<'a>(snapshots: &'a [Snapshot], zones: &'a [Zone]) -> ZoneSeries<'a> {
    let mut series: ZoneSeries<'a> = zones
        .iter()
        .map(|zone| (zone.id.as_str(), Vec::new()))
        .collect();

    for snapshot in snapshots {
        series
            .entry(snapshot.zone_id.as_str())
            .or_default()
            .push(snapshot);
    }

    for history in series.values_mut() {
        // sort_by is stable, so same-date snapshots stay in input order
        history.sort_by(|a, b| b.as_of.cmp(&a.as_of));
    }

    series
}

/// Each zone's most recent snapshot, skipping zones with no history
pub fn latest_per_zone<'a>(series: &ZoneSeries<'a>) -> Vec<(&'a str, &'a Snapshot)> {
    series
        .iter()
        .filter_map(|(zone_id, history)| history.first().map(|latest| (*zone_id, *latest)))
        .collect()
}

/// Lookup from zone id to display name
#[derive(Debug, Clone, Default)]
pub struct ZoneNames<'a> {
    names: HashMap<&'a str, &'a str>,
}

impl<'a> ZoneNames<'a> {
    pub fn new(zones: &'a [Zone]) -> Self {
        Self {
            names: zones
                .iter()
                .map(|zone| (zone.id.as_str(), zone.name.as_str()))
                .collect(),
        }
    }

    /// Display name for a zone, or [`UNKNOWN_ZONE_NAME`]
    pub fn resolve(&self, zone_id: &str) -> &'a str {
        self.names
            .get(zone_id)
            .copied()
            .unwrap_or(UNKNOWN_ZONE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BalanceInputs;
    use chrono::NaiveDate;

    fn snap(zone: &str, y: i32, m: u32, d: u32, input: f64) -> Snapshot {
        Snapshot::new(
            zone,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            BalanceInputs {
                system_input_volume_m3: input,
                billed_authorized_m3: 0.0,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_group_orders_newest_first() {
        let snapshots = vec![
            snap("a", 2026, 1, 31, 1.0),
            snap("b", 2026, 2, 28, 2.0),
            snap("a", 2026, 3, 31, 3.0),
            snap("a", 2026, 2, 28, 4.0),
        ];
        let series = group_by_zone(&snapshots, &[]);

        let a: Vec<f64> = series["a"].iter().map(|s| s.system_input_volume_m3).collect();
        assert_eq!(a, vec![3.0, 4.0, 1.0]);
        assert_eq!(series["b"].len(), 1);
    }

    #[test]
    fn test_group_same_date_keeps_input_order() {
        let snapshots = vec![
            snap("a", 2026, 3, 31, 1.0),
            snap("a", 2026, 3, 31, 2.0),
            snap("a", 2026, 1, 31, 3.0),
            snap("a", 2026, 3, 31, 4.0),
        ];
        let series = group_by_zone(&snapshots, &[]);

        let a: Vec<f64> = series["a"].iter().map(|s| s.system_input_volume_m3).collect();
        assert_eq!(a, vec![1.0, 2.0, 4.0, 3.0]);
    }

    #[test]
    fn test_group_seeds_directory_zones() {
        let zones = vec![Zone::new("z1", "North"), Zone::new("z2", "South")];
        let snapshots = vec![snap("z3", 2026, 1, 31, 1.0)];
        let series = group_by_zone(&snapshots, &zones);

        let keys: Vec<&str> = series.keys().copied().collect();
        assert_eq!(keys, vec!["z1", "z2", "z3"]);
        assert!(series["z1"].is_empty());
    }

    #[test]
    fn test_latest_per_zone_skips_empty() {
        let zones = vec![Zone::new("z1", "North")];
        let snapshots = vec![snap("z2", 2026, 1, 31, 1.0), snap("z2", 2026, 2, 28, 2.0)];
        let series = group_by_zone(&snapshots, &zones);
        let latest = latest_per_zone(&series);

        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].0, "z2");
        assert_eq!(latest[0].1.system_input_volume_m3, 2.0);
    }

    #[test]
    fn test_zone_names_fallback() {
        let zones = vec![Zone::new("z1", "North")];
        let names = ZoneNames::new(&zones);

        assert_eq!(names.resolve("z1"), "North");
        assert_eq!(names.resolve("missing"), UNKNOWN_ZONE_NAME);
    }
}
