//! Stateful in-memory `RecordStore` for tests that need saves to be read back.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{Collection, Snapshot};
use crate::traits::RecordStore;

#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<Collection, Snapshot>>,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self, key: Collection) -> anyhow::Result<Snapshot> {
        let snapshots = self.snapshots.lock().map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        Ok(snapshots.get(&key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: Collection, snapshot: &Snapshot) -> anyhow::Result<()> {
        let mut snapshots = self.snapshots.lock().map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        snapshots.insert(key, snapshot.clone());
        Ok(())
    }
}
