//! In-memory file system.
//!
//! Built once through [`MemoryFileSystemBuilder`] and immutable afterwards.
//! Folders can be marked to fail when listed, which is how walks over
//! unreadable or vanishing folders are exercised without touching the disk.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ErrorKind, FileSetError, FileSetResult};
use crate::fs::{FileSystem, Folder};
use crate::path::{join_segments, names_equal, normalize_separators, PREFERRED_SEPARATOR};

#[derive(Debug, Default)]
struct Node {
    name: String,
    files: Vec<String>,
    folders: Vec<Node>,
    failure: Option<ErrorKind>,
}

impl Node {
    fn child(&self, name: &str, case_sensitive: bool) -> Option<&Node> {
        self.folders
            .iter()
            .find(|f| names_equal(&f.name, name, case_sensitive))
    }

    fn child_mut_or_insert(&mut self, name: &str, case_sensitive: bool) -> &mut Node {
        let index = match self
            .folders
            .iter()
            .position(|f| names_equal(&f.name, name, case_sensitive))
        {
            Some(index) => index,
            None => {
                self.folders.push(Node {
                    name: name.to_string(),
                    ..Node::default()
                });
                self.folders.len() - 1
            }
        };
        &mut self.folders[index]
    }
}

fn split(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Builder for [`MemoryFileSystem`]. Paths are relative to the root.
#[derive(Debug, Default)]
pub struct MemoryFileSystemBuilder {
    root: Node,
    case_sensitive: bool,
    current_dir: Vec<String>,
}

impl MemoryFileSystemBuilder {
    /// Name lookups are case-insensitive unless this is set.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Adds a file, creating every folder on the way.
    pub fn add_file(mut self, path: &str) -> Self {
        let mut segments: Vec<String> = split(path).collect();
        if let Some(name) = segments.pop() {
            let folder = self.folder_mut(&segments);
            folder.files.push(name);
        }
        self
    }

    /// Adds an (empty) folder, creating every folder on the way.
    pub fn add_folder(mut self, path: &str) -> Self {
        let segments: Vec<String> = split(path).collect();
        self.folder_mut(&segments);
        self
    }

    /// Makes every listing of the folder at `path` fail with `kind`.
    ///
    /// The folder itself is still reported by its parent.
    pub fn fail_listing(mut self, path: &str, kind: ErrorKind) -> Self {
        let segments: Vec<String> = split(path).collect();
        self.folder_mut(&segments).failure = Some(kind);
        self
    }

    /// Folder that relative paths are resolved from; the root by default.
    pub fn current_dir(mut self, path: &str) -> Self {
        self.current_dir = split(path).collect();
        self
    }

    pub fn build(self) -> MemoryFileSystem {
        MemoryFileSystem {
            root: Arc::new(self.root),
            case_sensitive: self.case_sensitive,
            current_dir: self.current_dir,
        }
    }

    fn folder_mut(&mut self, segments: &[String]) -> &mut Node {
        let case_sensitive = self.case_sensitive;
        segments.iter().fold(&mut self.root, |node, segment| {
            node.child_mut_or_insert(segment, case_sensitive)
        })
    }
}

/// An immutable in-memory folder tree rooted at `/`.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    root: Arc<Node>,
    case_sensitive: bool,
    current_dir: Vec<String>,
}

impl MemoryFileSystem {
    pub fn builder() -> MemoryFileSystemBuilder {
        MemoryFileSystemBuilder::default()
    }

    /// Resolves `.` and `..` lexically. Returns `None` when `..` climbs above the root.
    fn resolve_segments(&self, path: &str) -> Option<Vec<String>> {
        let normalized = normalize_separators(path.trim());
        let mut segments = if normalized.starts_with(PREFERRED_SEPARATOR) {
            Vec::new()
        } else {
            self.current_dir.clone()
        };
        for segment in split(&normalized) {
            match segment.as_str() {
                "." => {}
                ".." => {
                    segments.pop()?;
                }
                _ => segments.push(segment),
            }
        }
        Some(segments)
    }

    fn lookup(&self, segments: &[String]) -> Option<&Node> {
        segments.iter().try_fold(self.root.as_ref(), |node, segment| {
            node.child(segment, self.case_sensitive)
        })
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    type Folder = MemoryFolder;

    async fn resolve_folder(&self, path: &str) -> FileSetResult<Option<MemoryFolder>> {
        let Some(segments) = self.resolve_segments(path) else {
            return Ok(None);
        };
        Ok(self.stored_names(&segments).map(|names| self.folder_at(names)))
    }
}

impl MemoryFileSystem {
    /// Looks up `segments` and returns the names as stored, which may differ
    /// in case from the lookup.
    fn stored_names(&self, segments: &[String]) -> Option<Vec<String>> {
        let mut node = self.root.as_ref();
        let mut names = Vec::with_capacity(segments.len());
        for segment in segments {
            node = node.child(segment, self.case_sensitive)?;
            names.push(node.name.clone());
        }
        Some(names)
    }

    fn folder_at(&self, segments: Vec<String>) -> MemoryFolder {
        let path = format!("{PREFERRED_SEPARATOR}{}", join_segments(&segments));
        MemoryFolder {
            fs: self.clone(),
            name: segments.last().cloned().unwrap_or_default(),
            path,
            segments,
        }
    }
}

/// A folder handle into a [`MemoryFileSystem`].
#[derive(Debug, Clone)]
pub struct MemoryFolder {
    fs: MemoryFileSystem,
    name: String,
    path: String,
    segments: Vec<String>,
}

impl MemoryFolder {
    fn node(&self) -> FileSetResult<&Node> {
        let node = self
            .fs
            .lookup(&self.segments)
            .ok_or_else(|| FileSetError::NotFound(self.path.clone()))?;
        match node.failure {
            None => Ok(node),
            Some(ErrorKind::NotFound) => Err(FileSetError::NotFound(self.path.clone())),
            Some(ErrorKind::AccessDenied) => Err(FileSetError::AccessDenied(self.path.clone())),
            Some(kind) => Err(FileSetError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("injected {kind} failure listing {}", self.path),
            ))),
        }
    }
}

#[async_trait]
impl Folder for MemoryFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    async fn list_files(&self) -> FileSetResult<Vec<String>> {
        Ok(self.node()?.files.clone())
    }

    async fn list_folders(&self) -> FileSetResult<Vec<MemoryFolder>> {
        let node = self.node()?;
        Ok(node
            .folders
            .iter()
            .map(|child| {
                let mut segments = self.segments.clone();
                segments.push(child.name.clone());
                self.fs.folder_at(segments)
            })
            .collect())
    }
}
