//! Typed view over one `RecordStore` collection.
//!
//! Writers go through `update`, which holds the collection's lock across
//! the whole load-mutate-save cycle. Nothing is cached between calls.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Collection, Course, Snapshot, UserRecord};
use crate::traits::RecordStore;

/// Records whose natural key lives in the enclosing map rather than the document.
pub(crate) trait Keyed {
    fn set_key(&mut self, key: &str);
}

impl Keyed for UserRecord {
    fn set_key(&mut self, key: &str) {
        self.username = key.to_string();
    }
}

impl Keyed for Course {
    fn set_key(&mut self, key: &str) {
        self.name = key.to_string();
        for (index, material) in self.materials.iter_mut().enumerate() {
            material.assign_missing_id(key, index);
        }
    }
}

pub(crate) struct Repository<T> {
    store: Arc<dyn RecordStore>,
    key: Collection,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> Repository<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    pub(crate) fn new(store: Arc<dyn RecordStore>, key: Collection) -> Self {
        Self {
            store,
            key,
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub(crate) async fn read_all(&self) -> Result<BTreeMap<String, T>> {
        let snapshot = self.store.load(self.key).await.map_err(AppError::storage)?;
        decode(self.key, snapshot)
    }

    /// Applies `mutate` to a fresh copy of the collection and persists it.
    /// If `mutate` fails, nothing is written.
    pub(crate) async fn update<R, F>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut BTreeMap<String, T>) -> Result<R>,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let out = mutate(&mut records)?;
        let snapshot = encode(self.key, &records)?;
        self.store
            .save(self.key, &snapshot)
            .await
            .map_err(AppError::storage)?;
        Ok(out)
    }
}

fn decode<T: Keyed + DeserializeOwned>(key: Collection, snapshot: Snapshot) -> Result<BTreeMap<String, T>> {
    snapshot
        .into_iter()
        .map(|(name, value)| {
            let mut record: T = serde_json::from_value(value)
                .map_err(|e| AppError::Storage(format!("malformed {key} record '{name}': {e}")))?;
            record.set_key(&name);
            Ok((name, record))
        })
        .collect()
}

fn encode<T: Serialize>(key: Collection, records: &BTreeMap<String, T>) -> Result<Snapshot> {
    records
        .iter()
        .map(|(name, record)| {
            let value = serde_json::to_value(record)
                .map_err(|e| AppError::Storage(format!("cannot encode {key} record '{name}': {e}")))?;
            Ok((name.clone(), value))
        })
        .collect()
}
