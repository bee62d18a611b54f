//! In-memory store

use anyhow::Result;
use tokio::sync::RwLock;

use nrw_core::{
    Intervention, InterventionSink, InterventionSource, Snapshot, SnapshotSink, SnapshotSource,
    Zone, ZoneDirectory,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<Vec<Snapshot>>,
    zones: RwLock<Vec<Zone>>,
    interventions: RwLock<Vec<Intervention>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SnapshotSource for MemoryStore {
    async fn snapshots(&self) -> Result<Vec<Snapshot>> {
        Ok(self.snapshots.read().await.clone())
    }
}

#[async_trait::async_trait]
impl SnapshotSink for MemoryStore {
    async fn append(&self, snapshot: &Snapshot) -> Result<()> {
        self.snapshots.write().await.push(snapshot.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl ZoneDirectory for MemoryStore {
    async fn zones(&self) -> Result<Vec<Zone>> {
        Ok(self.zones.read().await.clone())
    }

    async fn replace_zones(&self, zones: &[Zone]) -> Result<()> {
        *self.zones.write().await = zones.to_vec();
        Ok(())
    }
}

#[async_trait::async_trait]
impl InterventionSource for MemoryStore {
    async fn interventions(&self) -> Result<Vec<Intervention>> {
        Ok(self.interventions.read().await.clone())
    }
}

#[async_trait::async_trait]
impl InterventionSink for MemoryStore {
    async fn record(&self, intervention: &Intervention) -> Result<()> {
        self.interventions.write().await.push(intervention.clone());
        Ok(())
    }
}
