//! Path separator and name normalisation.
//!
//! Globs and provider paths may use `/` or `\`; everything inside the
//! library works on `/`. Resolving `.` and `..` is left to the file system
//! provider.

use std::borrow::Cow;

use unicode_normalization::{is_nfc, UnicodeNormalization};

/// The separator used in every path the library produces.
pub const PREFERRED_SEPARATOR: char = '/';

/// Separators accepted on input besides [`PREFERRED_SEPARATOR`].
pub const ALTERNATE_SEPARATORS: &[char] = &['\\'];

/// Returns `true` if `c` is any recognised separator.
pub fn is_separator(c: char) -> bool {
    c == PREFERRED_SEPARATOR || ALTERNATE_SEPARATORS.contains(&c)
}

/// Replaces every alternate separator with [`PREFERRED_SEPARATOR`].
pub fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|c| if is_separator(c) { PREFERRED_SEPARATOR } else { c })
        .collect()
}

/// Strips any run of trailing separators.
pub fn trim_trailing_separators(path: &str) -> &str {
    path.trim_end_matches(is_separator)
}

/// Normalises separators and trims trailing ones.
pub fn normalize(path: &str) -> String {
    trim_trailing_separators(&normalize_separators(path)).to_string()
}

/// Splits a normalised path into its segments.
///
/// Empty segments are kept so a rooted path keeps its leading `""`
/// (`/a/b` gives `["", "a", "b"]` and `/` gives `[""]`).
pub fn split_segments(path: &str) -> Vec<&str> {
    trim_trailing_separators(path)
        .split(PREFERRED_SEPARATOR)
        .collect()
}

/// Joins `name` onto `parent`, omitting the separator when `parent` is empty.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{PREFERRED_SEPARATOR}{name}")
    }
}

/// Joins `segments` with [`PREFERRED_SEPARATOR`].
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            joined.push(PREFERRED_SEPARATOR);
        }
        joined.push_str(segment.as_ref());
    }
    joined
}

/// Compares two names, ignoring case unless `case_sensitive` is set.
pub fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

/// `text` in Unicode composed form (NFC).
///
/// Only used for matching. Names handed back to callers keep the form the
/// file system stores, so they can be used for I/O.
pub fn to_nfc(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}
