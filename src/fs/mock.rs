use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory file tree.
///
/// Entries are kept in insertion order and `read_dir` lists them in that
/// order, which lets tests pin down a specific directory-listing order.
pub struct MockFileSystem {
    entries: RwLock<Vec<(PathBuf, FileType)>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            entries: RwLock::new(Vec::new()),
            root: root.clone(),
        };
        fs.insert(root, FileType::Directory);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        if let Some(parent) = path.parent() {
            self.ensure_parents(parent);
        }
        self.insert(path, FileType::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.ensure_parents(&path);
    }

    fn insert(&self, path: PathBuf, file_type: FileType) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = entries.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = file_type;
        } else {
            entries.push((path, file_type));
        }
    }

    fn lookup(&self, path: &Path) -> Option<FileType> {
        let path = self.normalize_path(path);
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, file_type)| *file_type)
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(&self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if self.lookup(&current).is_none() {
                self.insert(current.clone(), FileType::Directory);
            }
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lookup(path) == Some(FileType::Directory)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.lookup(path) == Some(FileType::File)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        if !self.is_dir(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        Ok(entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path.as_path()))
            .map(|(p, file_type)| DirEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string(),
                file_type: *file_type,
            })
            .collect())
    }
}
