//! # cb-storage-local
//! coursebox/crates/cb-plugins/cb-storage-local/src/lib.rs
//! Local filesystem implementation of `BlobStore`.
//! Keys are `<uuid>_<original name>`; thumbnails get a `thumb_` prefix.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use cb_core::traits::{BlobKind, BlobStore};
use tokio::fs;
use uuid::Uuid;

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g., "./uploads")
    root_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Maps a key to a file directly under the root, refusing anything
    /// that could escape it.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.root_path.join(name)),
            _ => None,
        }
    }
}

/// Keeps only the final path segment of a client-supplied file name.
fn base_name(original: &str) -> &str {
    original
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or("upload")
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save_upload(&self, original_name: &str, data: Vec<u8>, kind: BlobKind) -> anyhow::Result<String> {
        let stem = format!("{}_{}", Uuid::new_v4(), base_name(original_name));
        let key = match kind {
            BlobKind::Material => stem,
            BlobKind::Thumbnail => format!("thumb_{stem}"),
        };

        fs::create_dir_all(&self.root_path).await?;
        let target = self.root_path.join(&key);
        fs::write(&target, &data).await?;

        log::info!("stored upload {} ({} bytes)", key, data.len());
        Ok(key)
    }

    async fn get_url(&self, key: &str) -> anyhow::Result<Option<String>> {
        let Some(path) = self.resolve(key) else {
            log::warn!("rejected blob key {:?}", key);
            return Ok(None);
        };
        if fs::try_exists(&path).await? {
            Ok(Some(path.display().to_string()))
        } else {
            Ok(None)
        }
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let Some(path) = self.resolve(key) else {
            log::warn!("refusing to remove blob key {:?}", key);
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                log::info!("removed upload {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
