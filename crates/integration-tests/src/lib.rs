//! Shared wiring for the end-to-end tests: the real plugins over a temp dir.

use std::sync::Arc;

use cb_auth_argon::ArgonHasher;
use cb_core::{CourseLibrary, UserDirectory};
use cb_storage_local::LocalBlobStore;
use cb_store_json::JsonFileStore;
use tempfile::TempDir;

pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<JsonFileStore>,
    pub blobs: LocalBlobStore,
    pub directory: UserDirectory,
    pub library: CourseLibrary,
}

impl Harness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = Arc::new(JsonFileStore::new(dir.path().join("data")));
        let blobs = LocalBlobStore::new(dir.path().join("uploads"));
        let directory = UserDirectory::new(store.clone(), Arc::new(ArgonHasher::new()));
        let library = CourseLibrary::new(store.clone());
        Self { dir, store, blobs, directory, library }
    }

    /// Fresh services over the same files, as a new process would see them.
    pub fn reopen(&self) -> (UserDirectory, CourseLibrary) {
        let store = Arc::new(JsonFileStore::new(self.dir.path().join("data")));
        (
            UserDirectory::new(store.clone(), Arc::new(ArgonHasher::new())),
            CourseLibrary::new(store),
        )
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
