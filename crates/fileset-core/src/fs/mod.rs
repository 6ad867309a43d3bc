//! File system capability consumed by the walk.
//!
//! The walk only needs to resolve a base folder and list the files and
//! subfolders of a folder. [`FileSystem`] and [`Folder`] capture exactly that,
//! so any backend can be plugged in. Two are provided:
//! [`local::LocalFileSystem`] over the real disk and
//! [`memory::MemoryFileSystem`], an in-memory tree with failure injection.

pub mod local;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FileSetResult;

/// Resolves folder paths for a walk.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// The folder handle produced by this file system.
    type Folder: Folder;

    /// Resolves `path` to a folder, or `None` if nothing is there.
    ///
    /// Relative paths, `.` and `..` are interpreted by the implementation.
    async fn resolve_folder(&self, path: &str) -> FileSetResult<Option<Self::Folder>>;
}

/// A folder that can list its direct contents.
#[async_trait]
pub trait Folder: Send + Sync + Sized + 'static {
    /// The folder's own name; empty for a root.
    fn name(&self) -> &str;

    /// The folder's full path. Both `/` and `\` are accepted as separators.
    fn path(&self) -> &str;

    /// Names of the files directly inside this folder, in provider order.
    async fn list_files(&self) -> FileSetResult<Vec<String>>;

    /// The subfolders directly inside this folder, in provider order.
    async fn list_folders(&self) -> FileSetResult<Vec<Self>>;
}

#[async_trait]
impl<T: FileSystem> FileSystem for Arc<T> {
    type Folder = T::Folder;

    async fn resolve_folder(&self, path: &str) -> FileSetResult<Option<Self::Folder>> {
        (**self).resolve_folder(path).await
    }
}
