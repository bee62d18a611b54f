//! Boundary mapping from loosely typed JSON records to typed values
//!
//! Upstream records come from a data-access layer that does not guarantee
//! types: numbers may arrive as strings, fields may be missing or null.
//! Coercion happens here, once, so the analytics can assume clean inputs:
//!
//! - numeric fields accept numbers or numeric strings, anything else is 0
//! - optional numeric fields stay `None` when absent or null
//! - zone ids and dates are required; a record without them is rejected

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::types::{BalanceInputs, Intervention, Snapshot, Zone};
use crate::{EngineError, EngineResult};

/// Snapshot record as delivered by the data-access layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default, alias = "zoneId")]
    pub zone_id: Value,
    #[serde(default, alias = "asOf")]
    pub as_of: Value,
    #[serde(default, alias = "systemInputVolumeM3")]
    pub system_input_volume_m3: Value,
    #[serde(default, alias = "billedAuthorizedM3")]
    pub billed_authorized_m3: Value,
    #[serde(default, alias = "unbilledAuthorizedM3")]
    pub unbilled_authorized_m3: Value,
    #[serde(default, alias = "apparentLossesM3")]
    pub apparent_losses_m3: Value,
    #[serde(default, alias = "realLossesM3")]
    pub real_losses_m3: Value,
}

/// Zone record as delivered by the directory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawZone {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Value,
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = EngineError;

    fn try_from(raw: RawSnapshot) -> EngineResult<Self> {
        let zone_id = coerce_id(&raw.zone_id)
            .ok_or_else(|| EngineError::InvalidRecord("snapshot without zone_id".to_string()))?;
        let as_of = parse_date(&raw.as_of).ok_or_else(|| {
            EngineError::InvalidRecord(format!("snapshot for {zone_id} has invalid as_of"))
        })?;

        let inputs = BalanceInputs {
            system_input_volume_m3: coerce_f64(&raw.system_input_volume_m3),
            billed_authorized_m3: coerce_f64(&raw.billed_authorized_m3),
            unbilled_authorized_m3: coerce_opt_f64(&raw.unbilled_authorized_m3),
            apparent_losses_m3: coerce_opt_f64(&raw.apparent_losses_m3),
            real_losses_m3: coerce_opt_f64(&raw.real_losses_m3),
        };

        Ok(Snapshot::new(zone_id, as_of, inputs))
    }
}

impl TryFrom<RawZone> for Zone {
    type Error = EngineError;

    fn try_from(raw: RawZone) -> EngineResult<Self> {
        let id = coerce_id(&raw.id)
            .ok_or_else(|| EngineError::InvalidRecord("zone without id".to_string()))?;
        let name = match &raw.name {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => id.clone(),
        };
        Ok(Zone { id, name })
    }
}

/// Records accepted from a payload, plus how many were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport<T> {
    pub accepted: Vec<T>,
    pub rejected: usize,
}

/// Map a snapshot payload to typed snapshots
///
/// The payload must be a JSON array; anything else is a structural error.
/// Individual records that cannot be mapped are skipped and counted.
pub fn ingest_snapshots(payload: &Value) -> EngineResult<IngestReport<Snapshot>> {
    ingest_array(payload, "snapshots")
}

/// Map a zone directory payload to typed zones
pub fn ingest_zones(payload: &Value) -> EngineResult<IngestReport<Zone>> {
    ingest_array(payload, "zones")
}

/// Map an intervention payload to typed interventions
pub fn ingest_interventions(payload: &Value) -> EngineResult<IngestReport<Intervention>> {
    ingest_array(payload, "interventions")
}

fn ingest_array<T>(payload: &Value, what: &str) -> EngineResult<IngestReport<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let records = payload
        .as_array()
        .ok_or_else(|| EngineError::InvalidInput(format!("{what} payload must be an array")))?;

    let mut accepted = Vec::with_capacity(records.len());
    let mut rejected = 0;

    for (index, record) in records.iter().enumerate() {
        match T::deserialize(record) {
            Ok(value) => accepted.push(value),
            Err(e) => {
                warn!(index, error = %e, "Skipping invalid {} record", what);
                rejected += 1;
            }
        }
    }

    Ok(IngestReport { accepted, rejected })
}

/// Coerce a loosely typed value to a finite number, defaulting to 0
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Like [`coerce_f64`], but absent or null values stay `None`
pub fn coerce_opt_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        other => Some(coerce_f64(other)),
    }
}

/// Parse `YYYY-MM-DD`, RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS` timestamp
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `deserialize_with` helper for optional numeric fields
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_opt_f64(&value))
}

/// `deserialize_with` helper for optional zone references; numbers are stringified
pub fn lenient_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_id(&value))
}

/// `deserialize_with` helper for required dates
pub fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_date(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {value}")))
}
