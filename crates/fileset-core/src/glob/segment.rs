//! Glob segment classification shared by the compiler and the rule engine.

use crate::path::{normalize_separators, to_nfc, PREFERRED_SEPARATOR};

/// One `/`-separated piece of a glob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// No wildcard characters.
    Literal(&'a str),
    /// Contains `*` or `?` but is not exactly `*` or `**`.
    Pattern(&'a str),
    /// Exactly `*`: any single non-empty name.
    AnyFolder,
    /// Exactly `**`: zero or more whole segments.
    Recursive,
}

impl<'a> Segment<'a> {
    /// Classifies a single segment.
    pub fn classify(text: &'a str) -> Self {
        match text {
            "**" => Self::Recursive,
            "*" => Self::AnyFolder,
            _ if text.contains(['*', '?']) => Self::Pattern(text),
            _ => Self::Literal(text),
        }
    }
}

/// A glob split into classified segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPath {
    normalized: String,
    rooted: bool,
}

impl GlobPath {
    /// Normalises separators in `glob`.
    pub fn new(glob: &str) -> Self {
        let normalized = normalize_separators(&to_nfc(glob.trim()));
        let rooted = normalized.starts_with(PREFERRED_SEPARATOR);
        Self { normalized, rooted }
    }

    /// The glob with every separator replaced by `/`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// `true` when the glob starts with a separator.
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// The non-empty segments, classified.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        self.normalized
            .split(PREFERRED_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(Segment::classify)
            .collect()
    }
}
