//! The [`FileSet`] query: a base folder plus include and exclude globs.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::error::{ErrorKind, FileSetError, FileSetResult};
use crate::fs::{FileSystem, Folder};
use crate::glob::{PathFilter, RecursePolicy, RuleSequence};
use crate::router::{DispatchContext, ErrorRouter};
use crate::walk::{Listing, Walk, WalkPlan};

/// A set of files or folders below a base folder, selected by globs.
///
/// Globs are matched against paths relative to the base folder and may use
/// `/` or `\` as separator. `?` matches one character and `*` any run of
/// characters within a name; a segment that is just `*` matches any single
/// name and `**` matches zero or more folders. Matching ignores case unless
/// [`FileSet::case_sensitive`] is set.
///
/// A path is selected when at least one include glob matches it and no
/// exclude glob does. Only the include globs decide which folders are
/// descended into.
///
/// # Examples
///
/// ```no_run
/// use fileset_core::{FileSet, LocalFileSystem};
///
/// # async fn run() -> fileset_core::FileSetResult<()> {
/// let mut set = FileSet::new(LocalFileSystem::new(), "src");
/// set.include("**/*.rs").exclude("**/tests/**");
/// for path in set.get_files().await? {
///     println!("{path}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileSet<F: FileSystem> {
    fs: F,
    base_path: String,
    case_sensitive: bool,
    include: Vec<String>,
    exclude: Vec<String>,
    router: ErrorRouter,
}

impl<F: FileSystem> FileSet<F> {
    /// Creates an empty set rooted at `base_path`. The path is resolved by
    /// `fs` when a listing starts, not here.
    pub fn new(fs: F, base_path: impl Into<String>) -> Self {
        Self {
            fs,
            base_path: base_path.into(),
            case_sensitive: false,
            include: Vec::new(),
            exclude: Vec::new(),
            router: ErrorRouter::new(),
        }
    }

    pub fn case_sensitive(&mut self, case_sensitive: bool) -> &mut Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn include(&mut self, glob: impl Into<String>) -> &mut Self {
        self.include.push(glob.into());
        self
    }

    pub fn exclude(&mut self, glob: impl Into<String>) -> &mut Self {
        self.exclude.push(glob.into());
        self
    }

    /// Absorbs folder listing failures of `kind` (or a subkind), running
    /// `handler` inline before the walk moves on.
    pub fn catch<H>(&mut self, kind: ErrorKind, handler: H) -> &mut Self
    where
        H: Fn(&FileSetError) + Send + Sync + 'static,
    {
        self.catch_with_context(kind, handler, DispatchContext::Inline)
    }

    /// Like [`FileSet::catch`], with the handler run in `context`.
    pub fn catch_with_context<H>(
        &mut self,
        kind: ErrorKind,
        handler: H,
        context: DispatchContext,
    ) -> &mut Self
    where
        H: Fn(&FileSetError) + Send + Sync + 'static,
    {
        self.router.register(kind, Arc::new(handler), context);
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn includes(&self) -> &[String] {
        &self.include
    }

    pub fn excludes(&self) -> &[String] {
        &self.exclude
    }

    /// Every selected file, as relative paths.
    ///
    /// # Errors
    ///
    /// - [`FileSetError::InvalidBasePath`] if the base path does not resolve.
    /// - Any listing failure not absorbed by a registered handler.
    pub async fn get_files(&self) -> FileSetResult<Vec<String>> {
        self.stream_files().await?.try_collect().await
    }

    /// Every selected folder, as relative paths.
    ///
    /// # Errors
    ///
    /// As for [`FileSet::get_files`].
    pub async fn get_folders(&self) -> FileSetResult<Vec<String>> {
        self.stream_folders().await?.try_collect().await
    }

    /// Resolves the base folder and returns a lazy stream of selected files.
    ///
    /// Folders are listed only as the stream is polled. An unabsorbed listing
    /// failure is yielded as the stream's last item.
    pub async fn stream_files(&self) -> FileSetResult<BoxStream<'_, FileSetResult<String>>> {
        self.walk(Listing::Files).await
    }

    /// Resolves the base folder and returns a lazy stream of selected folders.
    pub async fn stream_folders(&self) -> FileSetResult<BoxStream<'_, FileSetResult<String>>> {
        self.walk(Listing::Folders).await
    }

    async fn walk(&self, listing: Listing) -> FileSetResult<BoxStream<'_, FileSetResult<String>>> {
        let filter = PathFilter::compile(&self.include, &self.exclude, self.case_sensitive)?;
        let rules = RuleSequence::from_globs(&self.include);
        let policy = RecursePolicy::compile(&rules, self.case_sensitive)?;
        let base = self.resolve_base().await?;

        tracing::debug!(
            "walking {} for {:?}: {} include, {} exclude, {} rule levels",
            base.path(),
            listing,
            self.include.len(),
            self.exclude.len(),
            rules.len()
        );

        let plan = WalkPlan {
            filter,
            policy,
            case_sensitive: self.case_sensitive,
            listing,
        };
        Ok(Walk::new(base, plan, &self.router).into_stream())
    }

    /// The base folder. Failures here are never routed to handlers.
    async fn resolve_base(&self) -> FileSetResult<F::Folder> {
        match self.fs.resolve_folder(&self.base_path).await {
            Ok(Some(folder)) => Ok(folder),
            Ok(None) => Err(FileSetError::InvalidBasePath(self.base_path.clone())),
            Err(err) if err.is_a(ErrorKind::NotFound) => {
                Err(FileSetError::InvalidBasePath(self.base_path.clone()))
            }
            Err(err) => Err(err),
        }
    }
}

impl<F: FileSystem> std::fmt::Debug for FileSet<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSet")
            .field("base_path", &self.base_path)
            .field("case_sensitive", &self.case_sensitive)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("router", &self.router)
            .finish()
    }
}

/// Files below `base_path` matching a single glob.
pub async fn get_files<F: FileSystem>(
    fs: F,
    glob: &str,
    base_path: &str,
) -> FileSetResult<Vec<String>> {
    let mut set = FileSet::new(fs, base_path);
    set.include(glob);
    set.get_files().await
}

/// Folders below `base_path` matching a single glob.
pub async fn get_folders<F: FileSystem>(
    fs: F,
    glob: &str,
    base_path: &str,
) -> FileSetResult<Vec<String>> {
    let mut set = FileSet::new(fs, base_path);
    set.include(glob);
    set.get_folders().await
}
