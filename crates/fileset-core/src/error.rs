//! Error types for `fileset-core`.
//!
//! All fallible operations in the library return [`FileSetResult<T>`],
//! which is an alias for `Result<T, FileSetError>`. Every error also has an
//! [`ErrorKind`], a small category hierarchy that the error router uses to
//! decide which registered handlers apply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unified error type for all file set operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum FileSetError {
    /// The base path of a query does not resolve to a folder.
    #[error("base path \"{0}\" is not valid")]
    InvalidBasePath(String),

    /// A folder vanished or could not be found while it was being listed.
    #[error("folder not found: {0}")]
    NotFound(String),

    /// The process lacks permission to list the folder.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// A visited folder is not below the base folder it was reached from.
    #[error("\"{path}\" is not below base folder \"{base}\"")]
    PathFormat { base: String, path: String },

    /// A generated regular expression failed to build.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Failed to parse a TOML configuration file or a configuration value.
    #[error("config parse error: {0}")]
    Config(String),

    /// Several independent operations failed.
    #[error("{} errors occurred", .0.len())]
    Aggregate(Vec<FileSetError>),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FileSetError {
    /// Maps an I/O error raised while touching `path` onto the most specific variant.
    pub(crate) fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied(path.to_string()),
            _ => Self::Io(err),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBasePath(_) => ErrorKind::InvalidBasePath,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::PathFormat { .. } => ErrorKind::PathFormat,
            Self::Pattern(_) => ErrorKind::Pattern,
            Self::Config(_) => ErrorKind::Config,
            Self::Aggregate(_) => ErrorKind::Aggregate,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns `true` when this error belongs to `kind` or one of its subkinds.
    pub fn is_a(&self, kind: ErrorKind) -> bool {
        self.kind().is_a(kind)
    }

    /// Unwraps an aggregate holding exactly one cause into that cause.
    ///
    /// Aggregates with zero or several causes, and every other variant,
    /// are returned unchanged.
    pub fn flatten(self) -> Self {
        match self {
            Self::Aggregate(mut causes) if causes.len() == 1 => causes.remove(0).flatten(),
            other => other,
        }
    }

    /// Combines the failures of a batch into a single error.
    ///
    /// Returns `None` when `errors` is empty and the sole cause when it
    /// holds exactly one.
    pub fn aggregate(errors: Vec<Self>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        Some(Self::Aggregate(errors).flatten())
    }
}

/// Convenience alias used throughout `fileset-core`.
pub type FileSetResult<T> = Result<T, FileSetError>;

/// Failure categories, arranged in a shallow hierarchy.
///
/// [`ErrorKind::Any`] is the root. [`ErrorKind::NotFound`] and
/// [`ErrorKind::AccessDenied`] are both kinds of [`ErrorKind::Io`]; every
/// other kind sits directly below the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Any,
    Io,
    NotFound,
    AccessDenied,
    InvalidBasePath,
    PathFormat,
    Pattern,
    Config,
    Aggregate,
}

impl ErrorKind {
    /// The immediate supertype, or `None` for [`ErrorKind::Any`].
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Any => None,
            Self::NotFound | Self::AccessDenied => Some(Self::Io),
            _ => Some(Self::Any),
        }
    }

    /// Returns `true` when `self` equals `ancestor` or descends from it.
    pub fn is_a(self, ancestor: Self) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Kebab-case name, as accepted by [`ErrorKind::from_str`].
    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Io => "io",
            Self::NotFound => "not-found",
            Self::AccessDenied => "access-denied",
            Self::InvalidBasePath => "invalid-base-path",
            Self::PathFormat => "path-format",
            Self::Pattern => "pattern",
            Self::Config => "config",
            Self::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ErrorKind {
    type Err = FileSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [ErrorKind; 9] = [
            ErrorKind::Any,
            ErrorKind::Io,
            ErrorKind::NotFound,
            ErrorKind::AccessDenied,
            ErrorKind::InvalidBasePath,
            ErrorKind::PathFormat,
            ErrorKind::Pattern,
            ErrorKind::Config,
            ErrorKind::Aggregate,
        ];
        ALL.into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FileSetError::Config(format!("unknown error kind: {s}")))
    }
}
