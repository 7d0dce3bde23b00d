//! # Course Library
//!
//! Courses and their ordered materials over the `courses` collection.
//! Role checks happen here, so callers need not re-validate.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::gate::AccessGate;
use crate::models::{Collection, Course, Identity, MaterialEntry, MaterialKey, MaterialKind, NewMaterial, Role};
use crate::repository::Repository;
use crate::traits::RecordStore;

pub struct CourseLibrary {
    courses: Repository<Course>,
}

impl CourseLibrary {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            courses: Repository::new(store, Collection::Courses),
        }
    }

    /// Appends a material, creating the course on first use.
    ///
    /// The course owner is the first uploader; later uploads by other
    /// teachers reuse the existing owner. Thumbnails are only kept for videos.
    pub async fn add_material(&self, uploader: &Identity, material: NewMaterial) -> Result<MaterialEntry> {
        AccessGate::require_role(uploader, Role::Teacher)?;
        material.validate()?;

        let image_ref = match material.kind {
            MaterialKind::Video => material.image_ref,
            MaterialKind::Document => {
                if material.image_ref.is_some() {
                    debug!("dropping thumbnail for document '{}'", material.title);
                }
                None
            }
        };

        let entry = MaterialEntry {
            id: Uuid::now_v7(),
            title: material.title,
            kind: material.kind,
            file_ref: material.file_ref,
            image_ref,
            like_count: 0,
            added_at: Utc::now(),
        };

        let course_name = material.course;
        let owner = self
            .courses
            .update(|courses| {
                let course = courses.entry(course_name.clone()).or_insert_with(|| {
                    info!("creating course '{}' owned by '{}'", course_name, uploader.id);
                    Course {
                        name: course_name.clone(),
                        owner_teacher: uploader.id.clone(),
                        materials: Vec::new(),
                    }
                });
                course.materials.push(entry.clone());
                Ok(course.owner_teacher.clone())
            })
            .await?;

        info!(
            "'{}' added {} '{}' to '{}' (owner '{}')",
            uploader.id, entry.kind, entry.title, course_name, owner
        );
        Ok(entry)
    }

    /// Adds one like and returns the new count. Every call counts.
    pub async fn like_material(&self, who: &Identity, course: &str, key: MaterialKey) -> Result<u64> {
        let likes = self
            .courses
            .update(|courses| {
                let entry = courses
                    .get_mut(course)
                    .ok_or_else(|| AppError::NotFound("course".into(), course.to_string()))?
                    .materials
                    .iter_mut()
                    .enumerate()
                    .find(|(index, m)| match key {
                        MaterialKey::Index(i) => *index == i,
                        MaterialKey::Id(id) => m.id == id,
                    })
                    .map(|(_, m)| m)
                    .ok_or_else(|| AppError::NotFound("material".into(), format!("{course} {key}")))?;
                entry.like_count += 1;
                Ok(entry.like_count)
            })
            .await?;

        debug!("'{}' liked {} in '{}' ({} likes)", who.id, key, course, likes);
        Ok(likes)
    }

    /// Every course, keyed by name.
    pub async fn list_courses(&self) -> Result<BTreeMap<String, Course>> {
        self.courses.read_all().await
    }

    pub async fn course(&self, name: &str) -> Result<Option<Course>> {
        Ok(self.courses.read_all().await?.remove(name))
    }
}
