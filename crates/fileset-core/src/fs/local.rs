//! The real file system, read through `tokio::fs`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::{FileSetError, FileSetResult};
use crate::fs::{FileSystem, Folder};

/// Resolves folders on the local disk.
///
/// Base paths are canonicalized, so relative paths are taken from the process
/// working directory and `.`/`..` are resolved by the operating system.
/// Symbolic links are not followed: a link to a folder is listed as a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    type Folder = LocalFolder;

    async fn resolve_folder(&self, path: &str) -> FileSetResult<Option<LocalFolder>> {
        let path = if path.trim().is_empty() { "." } else { path };
        let canonical = match tokio::fs::canonicalize(path).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FileSetError::from_io(path, e)),
        };
        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| FileSetError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Ok(None);
        }
        Ok(Some(LocalFolder::new(canonical)))
    }
}

/// One read of a folder, split by entry type.
#[derive(Debug, Clone)]
struct Entries {
    files: Vec<String>,
    folders: Vec<PathBuf>,
}

/// A folder on the local disk.
///
/// Names are returned as stored on disk, so joining them back onto the base
/// reaches the same entries. The folder is read at most once per handle:
/// files and subfolders come from the same snapshot.
#[derive(Debug, Clone)]
pub struct LocalFolder {
    path: PathBuf,
    display: String,
    name: String,
    entries: OnceCell<Entries>,
}

impl LocalFolder {
    fn new(path: PathBuf) -> Self {
        let display = path.to_string_lossy().into_owned();
        let name = path.file_name().map(entry_name).unwrap_or_default();
        Self {
            path,
            display,
            name,
            entries: OnceCell::new(),
        }
    }

    /// The folder's location as a native path.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    async fn entries(&self) -> FileSetResult<&Entries> {
        self.entries.get_or_try_init(|| self.read()).await
    }

    /// Entries whose type cannot be read are skipped.
    async fn read(&self) -> FileSetResult<Entries> {
        let mut read_dir = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|e| FileSetError::from_io(&self.display, e))?;

        let mut entries = Entries {
            files: Vec::new(),
            folders: Vec::new(),
        };
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FileSetError::from_io(&self.display, e))?
        {
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!("skipping {}: {e}", entry.path().display());
                    continue;
                }
            };
            if file_type.is_dir() {
                entries.folders.push(entry.path());
            } else {
                entries.files.push(entry_name(&entry.file_name()));
            }
        }
        Ok(entries)
    }
}

fn entry_name(name: &std::ffi::OsStr) -> String {
    name.to_string_lossy().into_owned()
}

#[async_trait]
impl Folder for LocalFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.display
    }

    async fn list_files(&self) -> FileSetResult<Vec<String>> {
        Ok(self.entries().await?.files.clone())
    }

    async fn list_folders(&self) -> FileSetResult<Vec<LocalFolder>> {
        Ok(self
            .entries()
            .await?
            .folders
            .iter()
            .cloned()
            .map(LocalFolder::new)
            .collect())
    }
}
