//! # Coursebox Binary
//!
//! The entry point that assembles the library from compile-time features
//! and drives it from the command line.

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use cb_core::{
    AccessGate, BlobKind, BlobStore, Collection, CourseLibrary, Identity, MaterialEntry, MaterialKey, MaterialKind,
    NewMaterial, RecordStore, Role, Session, UserDirectory,
};
use clap::Parser;
use cli::{Cli, Command, Credentials};

// Feature-gated imports: each port is filled by whichever plugin is compiled in
#[cfg(feature = "store-json")]
use cb_store_json::JsonFileStore;

#[cfg(feature = "storage-local")]
use cb_storage_local::LocalBlobStore;

#[cfg(feature = "auth-argon")]
use cb_auth_argon::ArgonHasher;

#[cfg(not(all(feature = "store-json", feature = "storage-local", feature = "auth-argon")))]
compile_error!("coursebox needs a record store, a blob store and a credential hasher feature enabled");

struct App {
    store: Arc<dyn RecordStore>,
    blobs: Box<dyn BlobStore>,
    directory: UserDirectory,
    library: CourseLibrary,
}

impl App {
    fn assemble(cli: &Cli) -> Self {
        // 1. Initialize Record Store Implementation
        let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(cli.data_dir.clone()));

        // 2. Initialize Blob Storage Implementation
        let blobs = Box::new(LocalBlobStore::new(cli.upload_dir.clone()));

        // 3. Initialize Credential Hasher Implementation
        let hasher = Arc::new(ArgonHasher::new());

        Self {
            directory: UserDirectory::new(Arc::clone(&store), hasher),
            library: CourseLibrary::new(Arc::clone(&store)),
            store,
            blobs,
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> anyhow::Result<Session> {
        Ok(Session::login(&self.directory, &credentials.user, &credentials.password).await?)
    }

    async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Register { username, password, role } => {
                let user = self.directory.register(&username, &password, role).await?;
                println!("registered {} as {}", user.username, user.role);
            }
            Command::Login { username, password } => {
                let session = Session::login(&self.directory, &username, &password).await?;
                let route = AccessGate::landing(&session);
                if let Some(identity) = session.identity() {
                    println!("{} ({}) -> {}", identity.id, identity.role, route.path());
                }
            }
            Command::Upload { credentials, course, title, kind, file, image } => {
                let session = self.sign_in(&credentials).await?;
                let uploader = session.require_identity()?;
                let entry = self.upload(uploader, course.clone(), title, kind, &file, image).await?;
                println!("added {} '{}' to {} (id {})", entry.kind, entry.title, course, entry.id);
            }
            Command::Like { credentials, course, index, id } => {
                let session = self.sign_in(&credentials).await?;
                let who = session.require_identity()?;
                let key = match (id, index) {
                    (Some(id), _) => MaterialKey::Id(id),
                    (None, Some(index)) => MaterialKey::Index(index),
                    (None, None) => anyhow::bail!("give a material index or --id"),
                };
                let likes = self.library.like_material(who, &course, key).await?;
                println!("{course} {key}: {likes} likes");
            }
            Command::List => {
                let courses = self.library.list_courses().await?;
                if courses.is_empty() {
                    println!("no courses yet");
                }
                for (name, course) in &courses {
                    println!("{name} (teacher: {})", course.owner_teacher);
                    for (index, m) in course.materials.iter().enumerate() {
                        let thumb = m.image_ref.as_deref().map(|i| format!(" [thumb {i}]")).unwrap_or_default();
                        println!(
                            "  {index}. {} [{}] {} likes, file {}{thumb}, id {}",
                            m.title, m.kind, m.like_count, m.file_ref, m.id
                        );
                    }
                }
            }
            Command::Open { key } => match self.blobs.get_url(&key).await? {
                Some(location) => println!("{location}"),
                None => anyhow::bail!("no upload named {key}"),
            },
            Command::Check => {
                for key in Collection::ALL {
                    let snapshot = self.store.load(key).await.with_context(|| format!("checking {key}"))?;
                    println!("{key}: {} records", snapshot.len());
                }
            }
        }
        Ok(())
    }

    /// Stores the file (and a video's thumbnail) and records the material.
    /// Blobs written for an upload that is then rejected are removed again.
    async fn upload(
        &self,
        uploader: &Identity,
        course: String,
        title: String,
        kind: MaterialKind,
        file: &Path,
        image: Option<PathBuf>,
    ) -> anyhow::Result<MaterialEntry> {
        // reject before any bytes hit the blob store
        AccessGate::require_role(uploader, Role::Teacher)?;
        let mut material = NewMaterial {
            course,
            title,
            kind,
            file_ref: file.display().to_string(),
            image_ref: None,
        };
        material.validate()?;

        material.file_ref = self.store_file(file, BlobKind::Material).await?;
        match (kind, image) {
            (MaterialKind::Video, Some(path)) => match self.store_file(&path, BlobKind::Thumbnail).await {
                Ok(key) => material.image_ref = Some(key),
                Err(e) => {
                    self.discard(&[material.file_ref]).await;
                    return Err(e);
                }
            },
            (MaterialKind::Document, Some(path)) => {
                log::warn!("ignoring thumbnail {} for a document", path.display());
            }
            (_, None) => {}
        }

        let written: Vec<String> = std::iter::once(material.file_ref.clone())
            .chain(material.image_ref.clone())
            .collect();
        match self.library.add_material(uploader, material).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                self.discard(&written).await;
                Err(e.into())
            }
        }
    }

    async fn discard(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.blobs.remove(key).await {
                log::warn!("could not remove orphaned upload {key}: {e:#}");
            }
        }
    }

    async fn store_file(&self, path: &Path, kind: BlobKind) -> anyhow::Result<String> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.blobs.save_upload(&name, data, kind).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    log::debug!(
        "data dir {}, upload dir {}",
        cli.data_dir.display(),
        cli.upload_dir.display()
    );

    let app = App::assemble(&cli);
    app.run(cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app(data_dir: &Path, upload_dir: &Path) -> App {
        let cli = Cli::parse_from([
            "coursebox",
            "--data-dir",
            data_dir.to_str().unwrap(),
            "--upload-dir",
            upload_dir.to_str().unwrap(),
            "list",
        ]);
        App::assemble(&cli)
    }

    fn alice() -> Identity {
        Identity { id: "alice".into(), role: Role::Teacher }
    }

    fn uploads(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn invalid_upload_writes_no_blob() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("lecture.mp4");
        std::fs::write(&source, b"frames").unwrap();
        let upload_dir = dir.path().join("uploads");
        let app = app(&dir.path().join("data"), &upload_dir);

        let err = app
            .upload(&alice(), "  ".into(), "L1".into(), MaterialKind::Video, &source, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("course name"));
        assert_eq!(uploads(&upload_dir), 0);
    }

    #[tokio::test]
    async fn failed_save_removes_stored_blobs() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("lecture.mp4");
        let cover = dir.path().join("cover.png");
        std::fs::write(&source, b"frames").unwrap();
        std::fs::write(&cover, b"png").unwrap();
        // a regular file where the data directory should be makes every load fail
        let data_dir = dir.path().join("data");
        std::fs::write(&data_dir, b"").unwrap();
        let upload_dir = dir.path().join("uploads");
        let app = app(&data_dir, &upload_dir);

        assert!(app
            .upload(&alice(), "Math101".into(), "L1".into(), MaterialKind::Video, &source, Some(cover))
            .await
            .is_err());
        assert_eq!(uploads(&upload_dir), 0);
    }

    #[tokio::test]
    async fn accepted_upload_keeps_its_blobs() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("lecture.mp4");
        std::fs::write(&source, b"frames").unwrap();
        let upload_dir = dir.path().join("uploads");
        let app = app(&dir.path().join("data"), &upload_dir);

        let entry = app
            .upload(&alice(), "Math101".into(), "L1".into(), MaterialKind::Video, &source, None)
            .await
            .unwrap();
        assert_eq!(uploads(&upload_dir), 1);
        assert!(app.blobs.get_url(&entry.file_ref).await.unwrap().is_some());
    }
}
