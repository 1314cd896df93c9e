use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

/// Trait for filesystem operations to enable testing with mocks
pub trait FileSystem: Send + Sync {
    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string contents to file, replacing any previous contents
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Size of a file in bytes
    fn file_size(&self, path: &Path) -> Result<u64>;

    /// Last modification time of a file
    fn modified(&self, path: &Path) -> Result<SystemTime>;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("Failed to remove file: {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?;
        Ok(metadata.len())
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read modification time: {:?}", path))
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[allow(dead_code)]
pub struct MockFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, (String, SystemTime)>>>,
    directories: Arc<RwLock<HashMap<PathBuf, ()>>>,
}

#[allow(dead_code)]
impl MockFileSystem {
    /// Create new empty mock filesystem
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            directories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a file with the current time as its modification time
    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.with_file_modified_at(path, contents, SystemTime::now())
    }

    /// Seed a file with an explicit modification time
    pub fn with_file_modified_at(
        self,
        path: impl Into<PathBuf>,
        contents: &str,
        modified: SystemTime,
    ) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), (contents.to_string(), modified));
        self
    }

    /// Seed a directory
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.directories.write().unwrap().insert(path.into(), ());
        self
    }

    /// Get captured file contents for testing assertions
    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|(contents, _)| contents.clone())
    }

    /// Check if file was written
    pub fn has_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|(contents, _)| contents.clone())
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), (contents.to_string(), SystemTime::now()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.files
            .write()
            .unwrap()
            .remove(path)
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
            || self.directories.read().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.read().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|(contents, _)| contents.len() as u64)
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|(_, modified)| *modified)
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }
}
