//! # Domain Models
//!
//! These structs represent the core entities of Coursebox.
//! Field names on the wire follow the document layout of the stored
//! snapshots (`password`, `teacher`, `videos`, ...), while the natural key
//! of each record lives in the surrounding map and is skipped here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result as AppResult};

/// Closed set of roles a user may register with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(AppError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Map key in the users collection; filled in on read
    #[serde(skip)]
    pub username: String,
    /// Argon2 PHC string, never the plain password
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: Role,
    #[serde(rename = "created", deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.username.clone(),
            role: self.role,
        }
    }
}

/// What kind of file a material points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Video,
    Document,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Video => "video",
            MaterialKind::Document => "document",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(MaterialKind::Video),
            "document" => Ok(MaterialKind::Document),
            other => Err(AppError::Validation(format!("unknown material type '{other}'"))),
        }
    }
}

/// A single uploaded item inside a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Stable handle. Nil until assigned for entries stored without one.
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MaterialKind,
    /// Opaque key handed out by the BlobStore
    #[serde(rename = "file")]
    pub file_ref: String,
    /// Thumbnail key, videos only
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(rename = "likes")]
    pub like_count: u64,
    #[serde(rename = "added", deserialize_with = "timestamp::deserialize")]
    pub added_at: DateTime<Utc>,
}

impl MaterialEntry {
    /// Gives an id-less entry one derived from its course, position and content,
    /// so every read of the same snapshot yields the same id.
    pub(crate) fn assign_missing_id(&mut self, course: &str, index: usize) {
        if self.id.is_nil() {
            let seed = format!("{course}\n{index}\n{}\n{}", self.added_at.to_rfc3339(), self.file_ref);
            self.id = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        }
    }
}

/// A named collection of materials. The owner is bound on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Map key in the courses collection; filled in on read
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "teacher")]
    pub owner_teacher: String,
    #[serde(rename = "videos", default)]
    pub materials: Vec<MaterialEntry>,
}

/// Input for `CourseLibrary::add_material`.
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub course: String,
    pub title: String,
    pub kind: MaterialKind,
    pub file_ref: String,
    pub image_ref: Option<String>,
}

impl NewMaterial {
    /// Checks the fields that must be present before anything is stored.
    pub fn validate(&self) -> AppResult<()> {
        if self.course.trim().is_empty() {
            return Err(AppError::Validation("course name must not be empty".into()));
        }
        if self.file_ref.is_empty() {
            return Err(AppError::Validation("no file selected".into()));
        }
        Ok(())
    }
}

/// How a caller points at a material inside a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKey {
    /// Position in the sequence; invalidated by later inserts
    Index(usize),
    /// Stable id
    Id(Uuid),
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialKey::Index(i) => write!(f, "#{i}"),
            MaterialKey::Id(id) => write!(f, "{id}"),
        }
    }
}

/// The authenticated caller, passed explicitly through every privileged call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub role: Role,
}

/// The named snapshot documents kept by a RecordStore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Courses,
    /// Kept on disk for compatibility; no operation reads or writes it
    Chats,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Courses, Collection::Chats];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Courses => "courses",
            Collection::Chats => "chats",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw contents of one collection: natural key to record document.
/// Backed by a sorted map, so serialization order is deterministic.
pub type Snapshot = serde_json::Map<String, serde_json::Value>;

/// Timestamps are written as RFC 3339. Older snapshots carry zone-less
/// ISO 8601 (`2025-03-01T10:00:00.123456`), read here as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("unrecognised timestamp '{raw}': {e}"))
    }

}
