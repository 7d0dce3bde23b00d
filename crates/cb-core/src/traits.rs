//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::models::{Collection, Snapshot};

/// Durable whole-document persistence for named collections.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the persisted snapshot, or an empty one if nothing was saved yet.
    /// Malformed content is an error.
    async fn load(&self, key: Collection) -> anyhow::Result<Snapshot>;

    /// Replaces the persisted snapshot with `snapshot` in full.
    async fn save(&self, key: Collection, snapshot: &Snapshot) -> anyhow::Result<()>;
}

/// One-way salted password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Produces a self-describing hash string (algorithm, salt, digest).
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// True if `password` matches `hash`. Unparseable hashes never match.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// What an uploaded blob is used for. Decides the key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Material,
    Thumbnail,
}

/// Storage contract for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Saves raw bytes and returns an opaque key to record as `file_ref`/`image_ref`.
    async fn save_upload(&self, original_name: &str, data: Vec<u8>, kind: BlobKind) -> anyhow::Result<String>;

    /// Returns where the blob can be fetched from, or None for an unknown key.
    async fn get_url(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Deletes a blob. Unknown keys are not an error.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
