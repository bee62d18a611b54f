//! Append-only JSON-lines store

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, create_dir_all, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use nrw_core::{
    Intervention, InterventionSink, InterventionSource, Snapshot, SnapshotSink, SnapshotSource,
    Zone, ZoneDirectory,
};

use crate::{StoreError, StoreResult};

const SNAPSHOTS_FILE: &str = "snapshots.jsonl";
const INTERVENTIONS_FILE: &str = "interventions.jsonl";
const ZONES_FILE: &str = "zones.json";

/// Directory-backed store: one JSON record per line, never rewritten
///
/// Snapshots and interventions are appended; the zone directory is a single
/// JSON array replaced atomically. Lines that fail to parse on load are
/// skipped with a warning so one bad write cannot take the dashboard down.
pub struct JsonlStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn append_line<T: Serialize>(&self, file: &str, record: &T) -> StoreResult<()> {
        let path = self.dir.join(file);
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        f.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    fn load_lines<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Vec<T>> {
        let path = self.dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(file, line = index + 1, error = %e, "Skipping unreadable record"),
            }
        }

        debug!(file, count = records.len(), "Loaded records");
        Ok(records)
    }
}

#[async_trait::async_trait]
impl SnapshotSource for JsonlStore {
    async fn snapshots(&self) -> Result<Vec<Snapshot>> {
        Ok(self.load_lines(SNAPSHOTS_FILE)?)
    }
}

#[async_trait::async_trait]
impl SnapshotSink for JsonlStore {
    async fn append(&self, snapshot: &Snapshot) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.append_line(SNAPSHOTS_FILE, snapshot)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl InterventionSource for JsonlStore {
    async fn interventions(&self) -> Result<Vec<Intervention>> {
        Ok(self.load_lines(INTERVENTIONS_FILE)?)
    }
}

#[async_trait::async_trait]
impl InterventionSink for JsonlStore {
    async fn record(&self, intervention: &Intervention) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.append_line(INTERVENTIONS_FILE, intervention)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ZoneDirectory for JsonlStore {
    async fn zones(&self) -> Result<Vec<Zone>> {
        let path = self.dir.join(ZONES_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e).into()),
        };
        let payload: serde_json::Value = serde_json::from_str(&content)?;
        let report = nrw_core::ingest_zones(&payload)?;
        Ok(report.accepted)
    }

    async fn replace_zones(&self, zones: &[Zone]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.dir.join(ZONES_FILE);
        let tmp = self.dir.join(format!("{ZONES_FILE}.tmp"));

        let body = serde_json::to_vec_pretty(zones)?;
        fs::write(&tmp, body).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }
}
