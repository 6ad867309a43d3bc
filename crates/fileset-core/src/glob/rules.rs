//! Folder pruning rules derived from include globs.
//!
//! Each include glob yields a [`RuleSequence`]: one [`SegmentRule`] per
//! folder depth below the base folder, describing which folder names could
//! still lead to a match. Sequences from several includes are merged into one
//! that admits a folder whenever *any* include might match beneath it.
//! [`RecursePolicy`] is the compiled form consulted during a walk.
//!
//! Exclude globs never contribute: a folder whose own path is excluded may
//! still contain paths that are not.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::FileSetResult;
use crate::glob::compiler::build_regex;
use crate::glob::segment::{GlobPath, Segment};
use crate::path::to_nfc;

/// What a folder at one depth must look like to be worth entering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentRule {
    /// Any folder name.
    MatchAnyFolder,
    /// A folder whose name matches at least one of these regex sources.
    MatchAnyFolderPattern(BTreeSet<String>),
    /// Any folder, at this depth and every depth below. Always the last rule.
    MatchZeroOrMoreFoldersRecursive,
}

impl SegmentRule {
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::MatchZeroOrMoreFoldersRecursive, _)
            | (_, Self::MatchZeroOrMoreFoldersRecursive) => Self::MatchZeroOrMoreFoldersRecursive,
            (Self::MatchAnyFolder, _) | (_, Self::MatchAnyFolder) => Self::MatchAnyFolder,
            (Self::MatchAnyFolderPattern(mut left), Self::MatchAnyFolderPattern(right)) => {
                left.extend(right);
                Self::MatchAnyFolderPattern(left)
            }
        }
    }

    fn is_recursive(&self) -> bool {
        matches!(self, Self::MatchZeroOrMoreFoldersRecursive)
    }
}

/// Per-depth folder rules, index 0 applying to the base folder's children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSequence {
    rules: Vec<SegmentRule>,
}

impl RuleSequence {
    /// Derives the rules for a single include glob.
    ///
    /// The final segment names the entry being selected rather than a folder
    /// to pass through, so it is ignored unless it is `**`. Rules stop at the
    /// first `**`: everything below it has to be visited anyway.
    pub fn from_glob(glob: &str) -> Self {
        let glob = GlobPath::new(glob);
        let mut segments = glob.segments();
        if !matches!(segments.last(), Some(Segment::Recursive)) {
            segments.pop();
        }

        let mut rules = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Recursive => {
                    rules.push(SegmentRule::MatchZeroOrMoreFoldersRecursive);
                    break;
                }
                Segment::AnyFolder => rules.push(SegmentRule::MatchAnyFolder),
                Segment::Literal(text) | Segment::Pattern(text) => {
                    rules.push(SegmentRule::MatchAnyFolderPattern(BTreeSet::from([
                        folder_name_source(text),
                    ])));
                }
            }
        }
        Self { rules }
    }

    /// Derives and merges the rules of every glob, in order.
    ///
    /// With no globs the sequence is empty and no folder is ever entered.
    pub fn from_globs<I>(globs: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        globs
            .into_iter()
            .map(|g| Self::from_glob(g.as_ref()))
            .reduce(Self::merge)
            .unwrap_or_default()
    }

    /// Combines two sequences into one permissive enough for both.
    ///
    /// Shared depths are merged rule by rule; a recursive rule on either side
    /// ends the result. Past the end of the shorter sequence the longer one's
    /// remaining rules are kept as they are.
    pub fn merge(self, other: Self) -> Self {
        let mut left = self.rules.into_iter();
        let mut right = other.rules.into_iter();
        let mut merged = Vec::new();

        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => {
                    let rule = a.merge(b);
                    let terminal = rule.is_recursive();
                    merged.push(rule);
                    if terminal {
                        break;
                    }
                }
                (Some(rest), None) => {
                    merged.push(rest);
                    merged.extend(left);
                    break;
                }
                (None, Some(rest)) => {
                    merged.push(rest);
                    merged.extend(right);
                    break;
                }
                (None, None) => break,
            }
        }

        Self { rules: merged }
    }

    pub fn rules(&self) -> &[SegmentRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `true` when the last rule keeps matching at every deeper level.
    pub fn is_open_ended(&self) -> bool {
        self.rules.last().is_some_and(SegmentRule::is_recursive)
    }
}

/// Regex source for a folder name segment: `?` is one character, `*` any run.
fn folder_name_source(segment: &str) -> String {
    let mut source = String::from("^");
    for c in segment.chars() {
        match c {
            '?' => source.push('.'),
            '*' => source.push_str(".*"),
            _ => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    source
}

#[derive(Debug, Clone)]
enum Level {
    Any,
    Names(Vec<Regex>),
}

/// A [`RuleSequence`] with its name patterns compiled, ready for a walk.
#[derive(Debug, Clone)]
pub struct RecursePolicy {
    levels: Vec<Level>,
    open_ended: bool,
}

impl RecursePolicy {
    /// Compiles every name pattern in `rules` once.
    ///
    /// # Errors
    ///
    /// [`crate::FileSetError::Pattern`] if a name pattern fails to build.
    pub fn compile(rules: &RuleSequence, case_sensitive: bool) -> FileSetResult<Self> {
        let levels = rules
            .rules()
            .iter()
            .map(|rule| match rule {
                SegmentRule::MatchAnyFolder | SegmentRule::MatchZeroOrMoreFoldersRecursive => {
                    Ok(Level::Any)
                }
                SegmentRule::MatchAnyFolderPattern(sources) => sources
                    .iter()
                    .map(|s| build_regex(s, case_sensitive))
                    .collect::<FileSetResult<Vec<_>>>()
                    .map(Level::Names),
            })
            .collect::<FileSetResult<Vec<_>>>()?;
        Ok(Self {
            levels,
            open_ended: rules.is_open_ended(),
        })
    }

    /// Whether a folder named `folder_name` at `depth` could contain a match.
    ///
    /// Depth 0 is a direct child of the base folder. Beyond the last rule
    /// only an open-ended (`**`) sequence keeps going.
    pub fn should_recurse(&self, folder_name: &str, depth: usize) -> bool {
        match self.levels.get(depth) {
            Some(Level::Any) => true,
            Some(Level::Names(regexes)) => {
                let folder_name = to_nfc(folder_name);
                regexes.iter().any(|r| r.is_match(&folder_name))
            }
            None => self.open_ended,
        }
    }
}
