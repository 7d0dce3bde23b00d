//! coursebox/crates/cb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Coursebox.

pub mod models;
pub mod traits;
pub mod error;
pub mod directory;
pub mod library;
pub mod gate;

mod repository;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
pub use directory::UserDirectory;
pub use library::CourseLibrary;
pub use gate::{AccessGate, Route, Session};


#[cfg(test)]
mod tests {
    use super::models::*;
    use std::str::FromStr;

    #[test]
    fn test_material_document_layout() {
        let entry = MaterialEntry {
            id: uuid::Uuid::now_v7(),
            title: "Kirish: введение".to_string(),
            kind: MaterialKind::Document,
            file_ref: "abc_notes.pdf".to_string(),
            image_ref: None,
            like_count: 3,
            added_at: chrono::Utc::now(),
        };
        let doc = serde_json::to_value(&entry).unwrap();
        assert_eq!(doc["type"], "document");
        assert_eq!(doc["file"], "abc_notes.pdf");
        assert_eq!(doc["likes"], 3);
        assert!(doc.get("image").is_none());

        let back: MaterialEntry = serde_json::from_value(doc).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_legacy_material_document_is_readable() {
        let doc = serde_json::json!({
            "title": "Lecture1", "type": "video", "file": "f1.mp4",
            "likes": 0, "added": "2025-03-01T10:00:00.123456"
        });
        let entry: MaterialEntry = serde_json::from_value(doc).unwrap();
        assert!(entry.id.is_nil());
        assert_eq!(entry.added_at.to_rfc3339(), "2025-03-01T10:00:00.123456+00:00");

        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "password": "h", "role": "student", "created": "2025-02-11T08:30:12.000981"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn test_role_parsing_is_closed() {
        assert_eq!(Role::from_str("Teacher").unwrap(), Role::Teacher);
        assert_eq!(Role::from_str("student").unwrap(), Role::Student);
        assert!(Role::from_str("admin").is_err());
    }
}
