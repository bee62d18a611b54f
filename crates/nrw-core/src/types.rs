//! Core data types for water-balance snapshots and derived dashboard views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::balance::{reported_losses_m3, water_balance};
use crate::ingest::{RawSnapshot, RawZone};
use crate::sparkline::Sparkline;

/// District Metered Area identifier
pub type ZoneId = String;

/// District Metered Area (DMA) reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawZone")]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
}

impl Zone {
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Raw balance volumes for one period, before derivation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BalanceInputs {
    pub system_input_volume_m3: f64,
    pub billed_authorized_m3: f64,
    pub unbilled_authorized_m3: Option<f64>,
    pub apparent_losses_m3: Option<f64>,
    pub real_losses_m3: Option<f64>,
}

/// One periodic water-balance reading for a zone
///
/// `nrw_m3` and `nrw_pct` are always derived from the raw volumes when the
/// snapshot is built; values supplied by upstream are never trusted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSnapshot")]
pub struct Snapshot {
    pub zone_id: ZoneId,
    pub as_of: NaiveDate,
    pub system_input_volume_m3: f64,
    pub billed_authorized_m3: f64,
    pub unbilled_authorized_m3: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apparent_losses_m3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_losses_m3: Option<f64>,

    /// Derived: input minus billed and unbilled authorized consumption
    pub nrw_m3: f64,

    /// Derived: `nrw_m3` as a percentage of system input (0 when input <= 0)
    pub nrw_pct: f64,

    /// Derived: apparent plus real losses when either was reported; display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_losses_m3: Option<f64>,
}

impl Snapshot {
    pub fn new(zone_id: impl Into<ZoneId>, as_of: NaiveDate, inputs: BalanceInputs) -> Self {
        let balance = water_balance(
            inputs.system_input_volume_m3,
            inputs.billed_authorized_m3,
            inputs.unbilled_authorized_m3,
        );

        Self {
            zone_id: zone_id.into(),
            as_of,
            system_input_volume_m3: balance.system_input_volume_m3,
            billed_authorized_m3: balance.billed_authorized_m3,
            unbilled_authorized_m3: balance.unbilled_authorized_m3,
            apparent_losses_m3: inputs.apparent_losses_m3,
            real_losses_m3: inputs.real_losses_m3,
            nrw_m3: balance.nrw_m3,
            nrw_pct: balance.nrw_pct,
            reported_losses_m3: reported_losses_m3(
                inputs.apparent_losses_m3,
                inputs.real_losses_m3,
            ),
        }
    }
}

/// Kind of field work recorded against a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    LeakRepair,
    PressureManagement,
    MeterReplacement,
    ActiveLeakDetection,
    IllegalConnectionRemoval,
    #[serde(other)]
    Other,
}

/// Loss-reduction work recorded for display; never fed back into NRW figures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intervention {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "zoneId",
        deserialize_with = "crate::ingest::lenient_opt_id"
    )]
    pub zone_id: Option<ZoneId>,

    #[serde(rename = "type")]
    pub kind: InterventionType,

    #[serde(deserialize_with = "crate::ingest::lenient_date")]
    pub date: NaiveDate,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::ingest::lenient_opt_f64"
    )]
    pub estimated_savings_m3_per_day: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::ingest::lenient_opt_f64"
    )]
    pub realized_savings_m3_per_day: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::ingest::lenient_opt_f64"
    )]
    pub cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Direction of change between the two most recent readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// One point of a zone's trailing sparkline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SparklinePoint {
    /// Short month name, e.g. "Jan"
    pub month_label: String,

    /// First day of the month the point stands for
    pub month_start: NaiveDate,

    pub nrw_pct: f64,

    /// False for padding points synthesized when history is short
    pub has_data: bool,
}

/// A zone's row in the loss ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    /// 1-based position, highest loss first
    pub rank: usize,
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub current_pct: f64,
    pub previous_pct: f64,
    pub trend: Trend,
    pub sparkline: Sparkline,

    /// `nrw_m3` of the latest snapshot
    pub total_loss_m3: f64,

    /// Date of the latest snapshot
    pub as_of: NaiveDate,

    /// Reported apparent plus real losses of the latest snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_losses_m3: Option<f64>,

    pub has_data: bool,
}

pub type RankingResponse = Vec<RankingEntry>;

/// Fleet-wide figures over each zone's latest snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KpiSummary {
    /// Unweighted mean across zones
    pub avg_nrw_pct: f64,
    pub total_loss_m3: f64,
    pub worst_zone_name: Option<String>,
    pub best_zone_name: Option<String>,
    pub zone_count: usize,
    pub has_data: bool,
}

/// Output of one computation pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub ranking: RankingResponse,
    pub kpis: KpiSummary,
}
