//! Copying the files selected by one or more file sets.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::error::{FileSetError, FileSetResult};
use crate::fileset::FileSet;
use crate::fs::local::LocalFileSystem;

/// One file set to copy, and where below the output folder its files go.
///
/// Only sets over the local disk can be copied, since the files are read
/// back from the disk through the set's base path.
pub struct CopyJob<'a> {
    pub file_set: &'a FileSet<LocalFileSystem>,
    /// Subfolder of the output folder; files land directly in it when `None`.
    pub output_base: Option<String>,
}

impl<'a> CopyJob<'a> {
    pub fn new(file_set: &'a FileSet<LocalFileSystem>) -> Self {
        Self {
            file_set,
            output_base: None,
        }
    }

    pub fn with_output_base(mut self, output_base: impl Into<String>) -> Self {
        self.output_base = Some(output_base.into());
        self
    }
}

/// Copies every file selected by each job into `output_folder`.
///
/// A file at `relative` below a set's base path is read from
/// `base_path/relative` on the local disk and written to
/// `output_folder[/output_base]/relative`, creating parent folders as needed.
/// Jobs run concurrently. Returns the number of files copied.
///
/// # Errors
///
/// Every job runs to completion or first failure; the failures of all jobs
/// are combined with [`FileSetError::aggregate`], so a single failure is
/// returned as is.
pub async fn copy_files(
    jobs: &[CopyJob<'_>],
    output_folder: &Path,
) -> FileSetResult<usize> {
    let results = join_all(jobs.iter().map(|job| copy_job(job, output_folder))).await;

    let mut copied = 0;
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(count) => copied += count,
            Err(err) => errors.push(err),
        }
    }
    match FileSetError::aggregate(errors) {
        Some(err) => Err(err),
        None => Ok(copied),
    }
}

async fn copy_job(job: &CopyJob<'_>, output_folder: &Path) -> FileSetResult<usize> {
    let source_base = Path::new(job.file_set.base_path());
    let target_base = match &job.output_base {
        Some(sub) => output_folder.join(native(sub)),
        None => output_folder.to_path_buf(),
    };

    let files = job.file_set.get_files().await?;
    for relative in &files {
        let src = source_base.join(native(relative));
        let dest = target_base.join(native(relative));
        copy_file(&src, &dest).await?;
    }
    tracing::debug!(
        "copied {} files from {} to {}",
        files.len(),
        source_base.display(),
        target_base.display()
    );
    Ok(files.len())
}

async fn copy_file(src: &Path, dest: &Path) -> FileSetResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileSetError::from_io(&parent.to_string_lossy(), e))?;
    }
    tokio::fs::copy(src, dest)
        .await
        .map_err(|e| FileSetError::from_io(&src.to_string_lossy(), e))?;
    Ok(())
}

/// Turns a `/`-separated relative path into a native one.
fn native(relative: &str) -> PathBuf {
    relative
        .split(crate::path::is_separator)
        .filter(|s| !s.is_empty())
        .collect()
}
