//! # cb-store-json
//!
//! Flat-file implementation of `RecordStore`.
//! Each collection is one pretty-printed JSON document (`<data_dir>/<name>.json`)
//! rewritten in full on every save.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use cb_core::models::{Collection, Snapshot};
use cb_core::traits::RecordStore;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct JsonFileStore {
    /// Directory holding users.json, courses.json, chats.json (e.g., "./data")
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path_for(&self, key: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    /// A missing file is an empty collection, not an error.
    async fn load(&self, key: Collection) -> anyhow::Result<Snapshot> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no snapshot for {} at {}, starting empty", key, path.display());
                return Ok(Snapshot::new());
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };

        serde_json::from_slice(&bytes).with_context(|| format!("malformed snapshot {}", path.display()))
    }

    /// Writes to a sibling temp file and renames it over the target,
    /// so readers only ever see a complete document.
    async fn save(&self, key: Collection, snapshot: &Snapshot) -> anyhow::Result<()> {
        let path = self.path_for(key);
        // serde_json's pretty printer indents by two spaces and leaves non-ASCII unescaped
        let body = serde_json::to_vec_pretty(snapshot).context("encoding snapshot")?;

        fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("creating {}", self.data_dir.display()))?;

        let tmp = temp_path(&path);
        write_synced(&tmp, &body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("replacing {}", path.display()));
        }

        log::debug!("saved {} ({} records, {} bytes)", key, snapshot.len(), body.len());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    Ok(())
}
