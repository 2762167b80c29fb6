//! Convenience matching built on [`search`]: first match, all matches,
//! capture snapshots.
//!
//! Iteration is non-overlapping, left to right. After an empty match the
//! cursor steps one character (per the pattern's encoding) so it always makes
//! progress, and an empty match directly after the previous match is skipped.

use crate::captures::Captures;
use crate::compile::CompiledPattern;
use crate::error::Result;
use crate::matcher::{check_subject, search, search_checked, MatchOutcome};
use crate::options::SearchOptions;
use crate::region::{MatchRegion, Span};

impl CompiledPattern {
    pub fn is_match(&self, subject: &[u8]) -> Result<bool> {
        Ok(self.find(subject)?.is_some())
    }

    pub fn find(&self, subject: &[u8]) -> Result<Option<Span>> {
        self.find_at(subject, 0)
    }

    /// First match starting at or after `offset`.
    pub fn find_at(&self, subject: &[u8], offset: usize) -> Result<Option<Span>> {
        let mut region = MatchRegion::for_pattern(self);
        match search(self, subject, offset, SearchOptions::empty(), &mut region)? {
            MatchOutcome::Matched => Ok(region.whole()),
            MatchOutcome::NoMatch => Ok(None),
        }
    }

    pub fn captures<'p, 's>(&'p self, subject: &'s [u8]) -> Result<Option<Captures<'p, 's>>> {
        let mut region = MatchRegion::for_pattern(self);
        search(self, subject, 0, SearchOptions::empty(), &mut region)?;
        Ok(Captures::from_region(self, subject, &region))
    }

    pub fn find_iter<'p, 's>(&'p self, subject: &'s [u8]) -> Matches<'p, 's> {
        Matches {
            cursor: Cursor::new(self, subject),
        }
    }

    /// Every non-overlapping match.
    pub fn find_all(&self, subject: &[u8]) -> Result<Vec<Span>> {
        self.find_iter(subject).collect()
    }

    pub fn captures_iter<'p, 's>(&'p self, subject: &'s [u8]) -> CaptureMatches<'p, 's> {
        CaptureMatches {
            cursor: Cursor::new(self, subject),
        }
    }
}

/// Shared stepping logic; one region is reused for the whole iteration.
struct Cursor<'p, 's> {
    pattern: &'p CompiledPattern,
    subject: &'s [u8],
    region: MatchRegion,
    pos: usize,
    last_end: Option<usize>,
    /// Subject passed encoding validation; checked on the first step only.
    checked: bool,
    done: bool,
}

impl<'p, 's> Cursor<'p, 's> {
    fn new(pattern: &'p CompiledPattern, subject: &'s [u8]) -> Self {
        Self {
            pattern,
            subject,
            region: MatchRegion::for_pattern(pattern),
            pos: 0,
            last_end: None,
            checked: false,
            done: false,
        }
    }

    /// Advance to the next accepted match, leaving it in `self.region`.
    fn advance(&mut self) -> Option<Result<Span>> {
        loop {
            if self.done || self.pos > self.subject.len() {
                return None;
            }
            if !self.checked {
                if let Err(e) = check_subject(self.pattern, self.subject, &mut self.region) {
                    self.done = true;
                    return Some(Err(e));
                }
                self.checked = true;
            }
            let outcome = search_checked(self.pattern, self.subject, self.pos, &mut self.region);
            let span = match outcome {
                Ok(MatchOutcome::Matched) => match self.region.whole() {
                    Some(span) => span,
                    None => {
                        self.done = true;
                        return None;
                    }
                },
                Ok(MatchOutcome::NoMatch) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if span.is_empty() {
                self.pos = span.end
                    + self
                        .pattern
                        .encoding()
                        .char_len_at(self.subject, span.end);
                if self.last_end == Some(span.end) {
                    continue;
                }
            } else {
                self.pos = span.end;
            }
            self.last_end = Some(span.end);
            return Some(Ok(span));
        }
    }
}

/// Iterator over match spans. Stops after the first engine error.
pub struct Matches<'p, 's> {
    cursor: Cursor<'p, 's>,
}

impl Iterator for Matches<'_, '_> {
    type Item = Result<Span>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance()
    }
}

/// Iterator over capture snapshots. Stops after the first engine error.
pub struct CaptureMatches<'p, 's> {
    cursor: Cursor<'p, 's>,
}

impl<'p, 's> Iterator for CaptureMatches<'p, 's> {
    type Item = Result<Captures<'p, 's>>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = &mut self.cursor;
        match cursor.advance()? {
            Ok(_) => Captures::from_region(cursor.pattern, cursor.subject, &cursor.region).map(Ok),
            Err(e) => Some(Err(e)),
        }
    }
}
