//! fileset core library: select files and folders with include/exclude globs.
//!
//! `fileset-core` walks a folder tree below a base folder and yields the
//! relative paths of the files (or folders) that match at least one include
//! glob and no exclude glob. Folders that no include glob could reach are
//! never listed. The walk is a lazy async stream over any backend that
//! implements [`FileSystem`].
//!
//! # Modules
//!
//! - [`fileset`]: The [`FileSet`] query and one-shot helpers.
//! - [`glob`]: Glob to regex compilation and the folder pruning rules.
//! - [`fs`]: The [`FileSystem`]/[`Folder`] traits, the local disk and an in-memory tree.
//! - [`router`]: Routing of folder listing failures to registered handlers.
//! - [`copy`]: Copying the files selected by several file sets.
//! - [`config`]: TOML description of a file set.
//! - [`path`]: Separator normalisation.
//! - [`error`]: Unified error type ([`FileSetError`]), [`ErrorKind`] and result alias.

pub mod config;
pub mod copy;
pub mod error;
pub mod fileset;
pub mod fs;
pub mod glob;
pub mod path;
pub mod router;
mod walk;

pub use config::settings::FileSetConfig;
pub use copy::{copy_files, CopyJob};
pub use error::{ErrorKind, FileSetError, FileSetResult};
pub use fileset::{get_files, get_folders, FileSet};
pub use fs::local::{LocalFileSystem, LocalFolder};
pub use fs::memory::{MemoryFileSystem, MemoryFileSystemBuilder, MemoryFolder};
pub use fs::{FileSystem, Folder};
pub use glob::{GlobMatcher, PathFilter, RecursePolicy, RuleSequence, SegmentRule};
pub use router::{DispatchContext, Dispatcher, ErrorHandler, ErrorRouter, Job};
