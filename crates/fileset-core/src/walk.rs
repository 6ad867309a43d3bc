//! The pruned, pull-based folder walk behind [`crate::FileSet`].
//!
//! The walk is depth-first and keeps an explicit stack of partially visited
//! folders instead of recursing, so it can be suspended between any two
//! results. Nothing is listed until the consumer asks for the next path, and
//! dropping the stream abandons the remaining folders.
//!
//! Ordering: in file mode a folder's files are produced when the folder is
//! entered, before any of its subfolders. In folder mode a subfolder is
//! produced when it is reached, before its own descendants.

use std::collections::VecDeque;
use std::vec;

use futures::stream::{self, BoxStream, StreamExt};

use crate::error::{FileSetError, FileSetResult};
use crate::fs::Folder;
use crate::glob::{PathFilter, RecursePolicy};
use crate::path;
use crate::router::ErrorRouter;

/// What a walk produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Listing {
    Files,
    Folders,
}

/// Everything a walk needs besides the folders themselves.
#[derive(Debug)]
pub(crate) struct WalkPlan {
    pub filter: PathFilter,
    pub policy: RecursePolicy,
    pub case_sensitive: bool,
    pub listing: Listing,
}

struct Frame<D> {
    subfolders: vec::IntoIter<D>,
    depth: usize,
}

pub(crate) struct Walk<'a, D: Folder> {
    plan: WalkPlan,
    router: &'a ErrorRouter,
    base_path: String,
    base_segments: Vec<String>,
    unvisited_base: Option<D>,
    stack: Vec<Frame<D>>,
    pending: VecDeque<String>,
    /// Unabsorbed listing failure, returned once `pending` is drained.
    deferred: Option<FileSetError>,
}

impl<'a, D: Folder> Walk<'a, D> {
    pub(crate) fn new(base: D, plan: WalkPlan, router: &'a ErrorRouter) -> Self {
        let base_path = path::normalize(base.path());
        let base_segments = path::split_segments(&base_path)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            plan,
            router,
            base_path,
            base_segments,
            unvisited_base: Some(base),
            stack: Vec::new(),
            pending: VecDeque::new(),
            deferred: None,
        }
    }

    pub(crate) fn into_stream(self) -> BoxStream<'a, FileSetResult<String>> {
        stream::try_unfold(self, |mut walk| async move {
            let next = walk.next_path().await?;
            Ok::<_, FileSetError>(next.map(|path| (path, walk)))
        })
        .boxed()
    }

    async fn next_path(&mut self) -> FileSetResult<Option<String>> {
        loop {
            while let Some(candidate) = self.pending.pop_front() {
                if self.plan.filter.is_match(&candidate) {
                    return Ok(Some(candidate));
                }
            }
            if let Some(err) = self.deferred.take() {
                return Err(err);
            }

            if let Some(base) = self.unvisited_base.take() {
                self.enter(base, 0).await;
                continue;
            }

            let next = match self.stack.last_mut() {
                None => return Ok(None),
                Some(frame) => frame.subfolders.next().map(|f| (f, frame.depth)),
            };
            let Some((folder, depth)) = next else {
                self.stack.pop();
                continue;
            };

            if self.plan.listing == Listing::Folders {
                let relative = self.relative_path(&folder)?;
                self.pending.push_back(relative);
            }
            if self.plan.policy.should_recurse(folder.name(), depth) {
                self.enter(folder, depth + 1).await;
            } else {
                tracing::trace!("pruned {}", folder.path());
            }
        }
    }

    /// Lists `folder` and pushes its contents. `depth` is the folder's own
    /// depth below the base.
    ///
    /// A failure no handler absorbs is kept in `deferred`, so paths already
    /// queued are still produced before it.
    async fn enter(&mut self, folder: D, depth: usize) {
        match self.list(&folder).await {
            Ok(subfolders) => self.stack.push(Frame {
                subfolders: subfolders.into_iter(),
                depth,
            }),
            Err(err) => match self.router.dispatch(err) {
                Ok(()) => tracing::warn!("skipping contents of {}", folder.path()),
                Err(err) => self.deferred = Some(err),
            },
        }
    }

    async fn list(&mut self, folder: &D) -> FileSetResult<Vec<D>> {
        if self.plan.listing == Listing::Files {
            let relative = self.relative_path(folder)?;
            let files = folder.list_files().await?;
            self.pending
                .extend(files.iter().map(|name| path::join(&relative, name)));
        }
        folder.list_folders().await
    }

    /// Path of `folder` relative to the base, joined with `/`.
    ///
    /// Debug builds verify that the base really is a prefix of the folder's path.
    fn relative_path(&self, folder: &D) -> FileSetResult<String> {
        let full = path::normalize(folder.path());
        let segments = path::split_segments(&full);
        let base_len = self.base_segments.len();

        if cfg!(debug_assertions) {
            let below_base = segments.len() >= base_len
                && self
                    .base_segments
                    .iter()
                    .zip(&segments)
                    .all(|(b, s)| path::names_equal(b, s, self.plan.case_sensitive));
            if !below_base {
                return Err(FileSetError::PathFormat {
                    base: self.base_path.clone(),
                    path: full,
                });
            }
        }

        Ok(path::join_segments(segments.get(base_len..).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fs::memory::MemoryFileSystem;
    use crate::fs::FileSystem;
    use crate::glob::RuleSequence;
    use futures::TryStreamExt;
    use std::sync::Arc;

    fn plan(include: &[&str], exclude: &[&str], listing: Listing) -> WalkPlan {
        let rules = RuleSequence::from_globs(include.iter().copied());
        WalkPlan {
            filter: PathFilter::compile(include, exclude, false).unwrap(),
            policy: RecursePolicy::compile(&rules, false).unwrap(),
            case_sensitive: false,
            listing,
        }
    }

    async fn run(
        fs: &MemoryFileSystem,
        include: &[&str],
        listing: Listing,
        router: &ErrorRouter,
    ) -> FileSetResult<Vec<String>> {
        let base = fs.resolve_folder("/").await.unwrap().unwrap();
        Walk::new(base, plan(include, &[], listing), router)
            .into_stream()
            .try_collect()
            .await
    }

    #[tokio::test]
    async fn files_come_before_subfolder_contents() {
        let fs = MemoryFileSystem::builder()
            .add_file("a/deep/x.txt")
            .add_file("a/y.txt")
            .add_file("top.txt")
            .build();
        let files = run(&fs, &["**/*"], Listing::Files, &ErrorRouter::new())
            .await
            .unwrap();
        assert_eq!(files, vec!["top.txt", "a/y.txt", "a/deep/x.txt"]);
    }

    #[tokio::test]
    async fn folders_come_before_their_descendants() {
        let fs = MemoryFileSystem::builder()
            .add_folder("a/b/c")
            .add_folder("d")
            .build();
        let folders = run(&fs, &["**/*"], Listing::Folders, &ErrorRouter::new())
            .await
            .unwrap();
        assert_eq!(folders, vec!["a", "a/b", "a/b/c", "d"]);
    }

    #[tokio::test]
    async fn pruned_folders_are_never_listed() {
        // A pruned folder that would fail if listed proves it was skipped.
        let fs = MemoryFileSystem::builder()
            .add_file("src/lib.rs")
            .add_file("target/debug/out.rs")
            .fail_listing("target", ErrorKind::AccessDenied)
            .build();
        let files = run(&fs, &["src/*.rs"], Listing::Files, &ErrorRouter::new())
            .await
            .unwrap();
        assert_eq!(files, vec!["src/lib.rs"]);
    }

    #[tokio::test]
    async fn unhandled_listing_failure_ends_the_walk() {
        let fs = MemoryFileSystem::builder()
            .add_file("a.txt")
            .add_file("locked/b.txt")
            .fail_listing("locked", ErrorKind::AccessDenied)
            .build();
        let base = fs.resolve_folder("/").await.unwrap().unwrap();
        let router = ErrorRouter::new();
        let mut stream = Walk::new(base, plan(&["**/*"], &[], Listing::Files), &router).into_stream();

        assert_eq!(stream.try_next().await.unwrap().as_deref(), Some("a.txt"));
        assert!(matches!(
            stream.try_next().await,
            Err(FileSetError::AccessDenied(_))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn unreadable_folder_is_produced_before_its_failure() {
        let fs = MemoryFileSystem::builder()
            .add_folder("locked/inner")
            .fail_listing("locked", ErrorKind::AccessDenied)
            .build();
        let base = fs.resolve_folder("/").await.unwrap().unwrap();
        let router = ErrorRouter::new();
        let mut stream =
            Walk::new(base, plan(&["**/*"], &[], Listing::Folders), &router).into_stream();

        assert_eq!(stream.try_next().await.unwrap().as_deref(), Some("locked"));
        assert!(matches!(
            stream.try_next().await,
            Err(FileSetError::AccessDenied(p)) if p == "/locked"
        ));
        assert!(stream.next().await.is_none());
    }

    /// Lists its files but fails to list its subfolders.
    struct HalfReadable;

    #[async_trait::async_trait]
    impl Folder for HalfReadable {
        fn name(&self) -> &str {
            "half"
        }

        fn path(&self) -> &str {
            "/half"
        }

        async fn list_files(&self) -> FileSetResult<Vec<String>> {
            Ok(vec!["one.txt".to_string(), "two.txt".to_string()])
        }

        async fn list_folders(&self) -> FileSetResult<Vec<Self>> {
            Err(FileSetError::AccessDenied("/half".to_string()))
        }
    }

    #[tokio::test]
    async fn listed_files_survive_a_failed_folder_listing() {
        let router = ErrorRouter::new();
        let mut stream =
            Walk::new(HalfReadable, plan(&["**/*"], &[], Listing::Files), &router).into_stream();

        assert_eq!(stream.try_next().await.unwrap().as_deref(), Some("one.txt"));
        assert_eq!(stream.try_next().await.unwrap().as_deref(), Some("two.txt"));
        assert!(matches!(
            stream.try_next().await,
            Err(FileSetError::AccessDenied(_))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn handled_listing_failure_skips_the_folder() {
        let fs = MemoryFileSystem::builder()
            .add_file("locked/b.txt")
            .add_file("open/c.txt")
            .fail_listing("locked", ErrorKind::NotFound)
            .build();
        let mut router = ErrorRouter::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        router.register(
            ErrorKind::Io,
            Arc::new(move |err: &FileSetError| seen_clone.lock().unwrap().push(err.to_string())),
            Default::default(),
        );

        let files = run(&fs, &["**/*"], Listing::Files, &router).await.unwrap();
        assert_eq!(files, vec!["open/c.txt"]);
        assert_eq!(*seen.lock().unwrap(), vec!["folder not found: /locked"]);
    }

    #[tokio::test]
    async fn relative_paths_strip_the_base() {
        let fs = MemoryFileSystem::builder().add_file("x/y/z/f.txt").build();
        let base = fs.resolve_folder("/X/y").await.unwrap().unwrap();
        let router = ErrorRouter::new();
        let files: Vec<String> = Walk::new(base, plan(&["**/*"], &[], Listing::Files), &router)
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(files, vec!["z/f.txt"]);
    }
}
