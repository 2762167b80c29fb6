//! Reusable match region.
//!
//! A [`MatchRegion`] wraps the engine's region allocation and is handed to
//! every search/match call by `&mut`, so repeated matches reuse one buffer.
//! Each call overwrites the previous contents. Spans are only readable after a
//! call that returned [`MatchOutcome::Matched`](crate::MatchOutcome); after a
//! `NoMatch` or an error every read yields `None`.

use std::fmt;
use std::ops::Range;

use onig::Region;

use crate::compile::CompiledPattern;

/// `[start, end)` byte offsets into the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// Sentinel written by [`MatchRegion::to_offsets`] for a group that did not
/// participate in the match.
pub const NO_MATCH_OFFSET: i64 = -1;

pub struct MatchRegion {
    raw: Region,
    /// Pattern whose group layout `raw` currently holds.
    bound_to: Option<u64>,
    /// True only after a successful match into `raw`.
    matched: bool,
}

// SAFETY: the engine region is a plain owned allocation (offset arrays and
// an optional capture tree) with no thread affinity. Access is only through
// `&mut self` or `&self` reads.
unsafe impl Send for MatchRegion {}

impl Default for MatchRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchRegion {
    pub fn new() -> Self {
        Self {
            raw: Region::new(),
            bound_to: None,
            matched: false,
        }
    }

    /// Region pre-sized for `pattern` (group 0 plus every capture group).
    pub fn for_pattern(pattern: &CompiledPattern) -> Self {
        Self {
            raw: Region::with_capacity(pattern.group_count() + 1),
            bound_to: Some(pattern.id()),
            matched: false,
        }
    }

    /// Whether the last match call into this region succeeded.
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Id of the pattern that last used this region.
    pub fn pattern_id(&self) -> Option<u64> {
        self.bound_to
    }

    /// Number of groups including group 0; 0 when there is no valid match.
    pub fn len(&self) -> usize {
        if self.matched {
            self.raw.len()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Span of `group`, `None` when the group did not participate, is out of
    /// range, or the region holds no valid match.
    pub fn get(&self, group: usize) -> Option<Span> {
        if !self.matched {
            return None;
        }
        self.raw.pos(group).map(Span::from)
    }

    /// Span of the whole match (group 0).
    pub fn whole(&self) -> Option<Span> {
        self.get(0)
    }

    /// Spans for groups `0..len()`.
    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        (0..self.len()).map(move |group| self.get(group))
    }

    /// Flat `[beg0, end0, beg1, end1, ...]` offsets with
    /// [`NO_MATCH_OFFSET`] for groups that did not participate.
    pub fn to_offsets(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for span in self.iter() {
            match span {
                Some(span) => {
                    out.push(span.start as i64);
                    out.push(span.end as i64);
                }
                None => {
                    out.push(NO_MATCH_OFFSET);
                    out.push(NO_MATCH_OFFSET);
                }
            }
        }
        out
    }

    /// Drop the current match; reads return `None` until the next success.
    pub fn invalidate(&mut self) {
        self.matched = false;
    }

    /// Hand the engine region to a match call on `pattern`.
    ///
    /// Contents left by a different pattern are cleared before reuse.
    pub(crate) fn prepare(&mut self, pattern: &CompiledPattern) -> &mut Region {
        self.matched = false;
        if self.bound_to != Some(pattern.id()) {
            self.raw.clear();
            self.bound_to = Some(pattern.id());
        }
        &mut self.raw
    }

    /// Mark the region as holding a valid match for its bound pattern.
    pub(crate) fn commit(&mut self) {
        self.matched = true;
    }
}

impl fmt::Debug for MatchRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchRegion")
            .field("pattern_id", &self.bound_to)
            .field("matched", &self.matched)
            .field("spans", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::options::{CompileOptions, SearchOptions};

    #[test]
    fn region_moves_between_threads_and_keeps_reusing() {
        fn assert_send<T: Send>() {}
        assert_send::<MatchRegion>();

        let p = compile(b"(b+)", CompileOptions::empty()).unwrap();
        let mut region = MatchRegion::for_pattern(&p);
        p.search(b"abbc", 0, SearchOptions::empty(), &mut region).unwrap();
        let region = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let mut region = region;
                    p.search(b"bbbx", 0, SearchOptions::empty(), &mut region).unwrap();
                    region
                })
                .join()
                .unwrap()
        });
        assert_eq!(region.get(1), Some(Span::new(0, 3)));
    }

    #[test]
    fn span_basics() {
        let s = Span::new(2, 5);
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.range(), 2..5);
        assert!(Span::from((4, 4)).is_empty());
    }

    #[test]
    fn fresh_region_reads_nothing() {
        let region = MatchRegion::new();
        assert!(!region.is_matched());
        assert_eq!(region.len(), 0);
        assert_eq!(region.get(0), None);
        assert!(region.to_offsets().is_empty());
        assert_eq!(region.pattern_id(), None);
    }
}
