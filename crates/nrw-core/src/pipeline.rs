//! Collaborator seams: where snapshots, zones and interventions come from
//! and where new ones are appended. The analytics never call these; the
//! service wires a store in front of [`crate::compute_dashboard`].

use anyhow::Result;

use crate::{Intervention, Snapshot, Zone};

#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// All snapshots visible to the caller, in storage order
    async fn snapshots(&self) -> Result<Vec<Snapshot>>;
}

#[async_trait::async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn append(&self, snapshot: &Snapshot) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ZoneDirectory: Send + Sync {
    async fn zones(&self) -> Result<Vec<Zone>>;

    /// Replace the whole directory
    async fn replace_zones(&self, zones: &[Zone]) -> Result<()>;
}

#[async_trait::async_trait]
pub trait InterventionSource: Send + Sync {
    async fn interventions(&self) -> Result<Vec<Intervention>>;
}

#[async_trait::async_trait]
pub trait InterventionSink: Send + Sync {
    async fn record(&self, intervention: &Intervention) -> Result<()>;
}
