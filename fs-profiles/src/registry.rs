//! Process-wide registry of files the persistence layer currently
//! holds open. Deletion refuses to touch a registered path, so a
//! profile cannot be removed out from under an in-flight load or
//! save.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

lazy_static! {
    static ref OPEN_FILES: Mutex<HashSet<PathBuf>> =
        Mutex::new(HashSet::new());
}

/// Register `path` as open for the lifetime of the returned guard.
pub fn acquire(path: &Path) -> OpenGuard {
    OPEN_FILES
        .lock()
        .unwrap()
        .insert(path.to_path_buf());
    OpenGuard {
        path: path.to_path_buf(),
    }
}

/// Whether `path` is currently registered as open by this process.
pub fn is_open(path: &Path) -> bool {
    OPEN_FILES.lock().unwrap().contains(path)
}

/// RAII handle deregistering its path on drop.
pub struct OpenGuard {
    path: PathBuf,
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        OPEN_FILES.lock().unwrap().remove(&self.path);
    }
}
