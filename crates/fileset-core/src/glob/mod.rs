//! Glob handling: segment classification, regex compilation and the
//! folder pruning rules derived from include globs.

pub mod compiler;
pub mod rules;
pub mod segment;

pub use compiler::{GlobMatcher, PathFilter};
pub use rules::{RecursePolicy, RuleSequence, SegmentRule};
pub use segment::{GlobPath, Segment};
