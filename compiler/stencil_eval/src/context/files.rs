//! Page sources.
//!
//! Paths are `/`-separated and relative to the source root; a leading `/`
//! or `./` is ignored.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// When a file last changed, in whatever unit the source tracks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileStamp {
    Modified(SystemTime),
    Version(u64),
}

/// A tree of page files.
pub trait VirtualFiles: Send + Sync {
    fn read(&self, path: &str) -> Option<String>;

    fn modified(&self, path: &str) -> Option<FileStamp>;

    fn exists(&self, path: &str) -> bool {
        self.modified(path).is_some()
    }
}

/// Strip `./`, leading slashes and empty segments.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of a normalized path (`""` at the root).
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Find `name` in `dir` or the nearest ancestor directory that has it.
pub fn cascade(files: &dyn VirtualFiles, dir: &str, name: &str) -> Option<String> {
    let mut dir = normalize_path(dir);
    loop {
        let candidate = join(&dir, name);
        if files.exists(&candidate) {
            return Some(candidate);
        }
        if dir.is_empty() {
            return None;
        }
        dir = parent_dir(&dir).to_string();
    }
}

/// Files held in memory. Each write bumps a version used as the stamp.
#[derive(Default)]
pub struct MemoryFiles {
    files: RwLock<FxHashMap<String, (String, u64)>>,
    version: AtomicU64,
}

impl MemoryFiles {
    pub fn new() -> Self {
        MemoryFiles::default()
    }

    pub fn write(&self, path: &str, contents: impl Into<String>) {
        let version = self.version.fetch_add(1, Ordering::Relaxed) + 1;
        self.files
            .write()
            .insert(normalize_path(path), (contents.into(), version));
    }

    #[must_use]
    pub fn with_file(self, path: &str, contents: impl Into<String>) -> Self {
        self.write(path, contents);
        self
    }

    pub fn remove(&self, path: &str) -> bool {
        self.files.write().remove(&normalize_path(path)).is_some()
    }
}

impl VirtualFiles for MemoryFiles {
    fn read(&self, path: &str) -> Option<String> {
        self.files
            .read()
            .get(&normalize_path(path))
            .map(|(contents, _)| contents.clone())
    }

    fn modified(&self, path: &str) -> Option<FileStamp> {
        self.files
            .read()
            .get(&normalize_path(path))
            .map(|(_, version)| FileStamp::Version(*version))
    }
}

/// Files under a directory on disk.
pub struct FileSystemFiles {
    root: PathBuf,
}

impl FileSystemFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemFiles { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let path = normalize_path(path);
        if path.split('/').any(|segment| segment == "..") {
            return None;
        }
        Some(self.root.join(path))
    }
}

impl VirtualFiles for FileSystemFiles {
    fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.resolve(path)?).ok()
    }

    fn modified(&self, path: &str) -> Option<FileStamp> {
        let metadata = std::fs::metadata(self.resolve(path)?).ok()?;
        if !metadata.is_file() {
            return None;
        }
        metadata.modified().ok().map(FileStamp::Modified)
    }
}
