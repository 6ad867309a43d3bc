//! Glob to regular expression compilation.
//!
//! A glob compiles to one or more anchored regexes over a complete relative
//! path; the path matches the glob when any of them matches. Several regexes
//! are needed because `**` may stand for zero folders, in which case the
//! separator in front of the following segment must disappear as well. Each
//! `**` therefore forks every partially built regex into a "zero folders"
//! copy and a "one or more folders" copy.

use regex::{Regex, RegexBuilder};

use crate::error::FileSetResult;
use crate::glob::segment::{GlobPath, Segment};
use crate::path::{to_nfc, PREFERRED_SEPARATOR};

/// The compiled form of a single glob.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    glob: String,
    regexes: Vec<Regex>,
}

impl GlobMatcher {
    /// Compiles `glob`, case-insensitively unless `case_sensitive` is set.
    ///
    /// # Errors
    ///
    /// [`crate::FileSetError::Pattern`] if a generated regex fails to build.
    pub fn compile(glob: &str, case_sensitive: bool) -> FileSetResult<Self> {
        let glob = GlobPath::new(glob);
        let regexes = regex_sources(&glob)
            .iter()
            .map(|source| build_regex(source, case_sensitive))
            .collect::<FileSetResult<Vec<_>>>()?;
        Ok(Self {
            glob: glob.as_str().to_string(),
            regexes,
        })
    }

    /// The normalised glob this matcher was built from.
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// The regexes that together implement the glob.
    pub fn regexes(&self) -> &[Regex] {
        &self.regexes
    }

    /// Returns `true` if `relative_path` matches the glob.
    ///
    /// Both sides are compared in composed Unicode form, so a decomposed
    /// name on disk still matches a composed glob.
    pub fn is_match(&self, relative_path: &str) -> bool {
        let relative_path = to_nfc(relative_path);
        self.regexes.iter().any(|r| r.is_match(&relative_path))
    }
}

/// Include and exclude globs applied together to a relative path.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<GlobMatcher>,
    exclude: Vec<GlobMatcher>,
}

impl PathFilter {
    /// Compiles every include and exclude glob.
    ///
    /// # Errors
    ///
    /// [`crate::FileSetError::Pattern`] if a generated regex fails to build.
    pub fn compile<I, E>(include: I, exclude: E, case_sensitive: bool) -> FileSetResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let include = include
            .into_iter()
            .map(|g| GlobMatcher::compile(g.as_ref(), case_sensitive))
            .collect::<FileSetResult<Vec<_>>>()?;
        let exclude = exclude
            .into_iter()
            .map(|g| GlobMatcher::compile(g.as_ref(), case_sensitive))
            .collect::<FileSetResult<Vec<_>>>()?;
        Ok(Self { include, exclude })
    }

    /// A path is kept iff some include matches it and no exclude does.
    pub fn is_match(&self, relative_path: &str) -> bool {
        self.include.iter().any(|m| m.is_match(relative_path))
            && !self.exclude.iter().any(|m| m.is_match(relative_path))
    }
}

pub(crate) fn build_regex(source: &str, case_sensitive: bool) -> FileSetResult<Regex> {
    Ok(RegexBuilder::new(source)
        .case_insensitive(!case_sensitive)
        .build()?)
}

/// Builds the regex sources for a glob, one per `**` fork.
pub fn regex_sources(glob: &GlobPath) -> Vec<String> {
    let separator = regex::escape(&PREFERRED_SEPARATOR.to_string());
    let not_separator = format!("[^{separator}]");
    let segments = glob.segments();

    let mut accumulators = vec![String::from("^")];
    let mut skip_separator = true;

    for (index, segment) in segments.iter().enumerate() {
        if skip_separator {
            skip_separator = false;
        } else {
            append(&mut accumulators, &separator);
        }

        match segment {
            Segment::Recursive => {
                let zero_folders = accumulators.clone();
                if index + 1 == segments.len() {
                    // Nothing follows: match any descendants, or the folder itself.
                    append(&mut accumulators, ".+");
                    accumulators.extend(zero_folders.into_iter().map(|mut a| {
                        if a.ends_with(&separator) && a.len() > 1 {
                            a.truncate(a.len() - separator.len());
                        }
                        a
                    }));
                } else {
                    append(&mut accumulators, &format!(".*{separator}"));
                    accumulators.extend(zero_folders);
                }
                skip_separator = true;
            }
            Segment::AnyFolder => append(&mut accumulators, &format!("{not_separator}+")),
            Segment::Literal(text) | Segment::Pattern(text) => {
                append(&mut accumulators, &segment_source(text, &not_separator));
            }
        }
    }

    append(&mut accumulators, "$");
    accumulators
}

fn segment_source(text: &str, not_separator: &str) -> String {
    let mut out = String::new();
    let mut literal = String::new();
    for c in text.chars() {
        match c {
            '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(not_separator);
            }
            '*' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(not_separator);
                out.push('*');
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}

fn append(accumulators: &mut [String], fragment: &str) {
    for accumulator in accumulators.iter_mut() {
        accumulator.push_str(fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(glob: &str) -> Vec<String> {
        regex_sources(&GlobPath::new(glob))
    }

    fn matches(glob: &str, path: &str) -> bool {
        GlobMatcher::compile(glob, false).unwrap().is_match(path)
    }

    #[test]
    fn literal_glob_is_escaped() {
        assert_eq!(sources("a/b.txt"), vec![r"^a/b\.txt$"]);
    }

    #[test]
    fn wildcards_inside_a_segment() {
        assert_eq!(sources("?x*.rs"), vec![r"^[^/]x[^/]*\.rs$"]);
    }

    #[test]
    fn lone_star_requires_a_name() {
        assert_eq!(sources("a/*"), vec!["^a/[^/]+$"]);
        assert!(!matches("a/*", "a/"));
        assert!(matches("a/*", "a/x"));
        assert!(!matches("a/*", "a/x/y"));
    }

    #[test]
    fn recursive_forks_accumulators() {
        assert_eq!(
            sources("a/**/f.txt"),
            vec![r"^a/.*/f\.txt$".to_string(), r"^a/f\.txt$".to_string()]
        );
    }

    #[test]
    fn nested_recursive_doubles_again() {
        assert_eq!(sources("**/x/**/y").len(), 4);
    }

    #[test]
    fn recursive_matches_zero_or_more_levels() {
        assert!(matches("a/**/file.txt", "a/file.txt"));
        assert!(matches("a/**/file.txt", "a/b/file.txt"));
        assert!(matches("a/**/file.txt", "a/b/c/file.txt"));
        assert!(!matches("a/**/file.txt", "b/file.txt"));
    }

    #[test]
    fn leading_recursive_matches_root_files() {
        assert!(matches("**/*.zzz", "FileInRoot.zzz"));
        assert!(matches("**/*.zzz", "a/b/FileInSubFolder.zzz"));
        assert!(!matches("**/*.zzz", "a/b/FileInSubFolder.yyy"));
    }

    #[test]
    fn trailing_recursive_matches_descendants_and_folder() {
        assert_eq!(sources("a/**"), vec!["^a/.+$".to_string(), "^a$".to_string()]);
        assert!(matches("a/**", "a"));
        assert!(matches("a/**", "a/b"));
        assert!(matches("a/**", "a/b/c.txt"));
        assert!(!matches("a/**", "ab"));
    }

    #[test]
    fn case_insensitive_by_default() {
        assert!(matches("**/FILE.TXT", "a/file.txt"));
        let sensitive = GlobMatcher::compile("**/FILE.TXT", true).unwrap();
        assert!(!sensitive.is_match("a/file.txt"));
        assert!(sensitive.is_match("a/FILE.TXT"));
    }

    #[test]
    fn backslash_globs_are_normalised() {
        assert!(matches(r"a\**\*.txt", "a/b/c.txt"));
        assert_eq!(GlobMatcher::compile(r"a\b", false).unwrap().glob(), "a/b");
    }

    #[test]
    fn rooted_glob_anchors_at_base() {
        assert!(matches("/a/*.txt", "a/x.txt"));
        assert!(!matches("/a/*.txt", "b/a/x.txt"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(matches("a+b/(c).txt", "a+b/(c).txt"));
        assert!(!matches("a+b/(c).txt", "aab/c.txt"));
    }

    #[test]
    fn path_filter_applies_excludes_after_includes() {
        let filter = PathFilter::compile(
            ["**/*.zzz", "**/*.yyy"],
            ["**/*eInF*z*", "a/*.yyy"],
            false,
        )
        .unwrap();
        assert!(filter.is_match("FileInRoot.zzz"));
        assert!(filter.is_match("a/b/FileInSubFolder.yyy"));
        assert!(!filter.is_match("a/FileInFolder.yyy"));
        assert!(!filter.is_match("c/FileInFolder.zzz"));
        assert!(!filter.is_match("a/AnotherFileInFolder.txt"));
    }

    #[test]
    fn composed_and_decomposed_names_match_alike() {
        assert!(matches("caf\u{e9}.txt", "cafe\u{301}.txt"));
        assert!(matches("cafe\u{301}/*", "caf\u{e9}/menu.txt"));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = PathFilter::compile(Vec::<String>::new(), Vec::<String>::new(), false).unwrap();
        assert!(!filter.is_match("anything"));
    }
}
