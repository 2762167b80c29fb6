//! Capture extraction: a snapshot of one successful match.

use crate::compile::CompiledPattern;
use crate::region::{MatchRegion, Span};

/// Groups of one match, borrowing the subject they index into.
#[derive(Debug, Clone)]
pub struct Captures<'p, 's> {
    pattern: &'p CompiledPattern,
    subject: &'s [u8],
    spans: Vec<Option<Span>>,
}

impl<'p, 's> Captures<'p, 's> {
    /// Snapshot `region`; `None` when it holds no valid match.
    pub fn from_region(
        pattern: &'p CompiledPattern,
        subject: &'s [u8],
        region: &MatchRegion,
    ) -> Option<Self> {
        if !region.is_matched() || region.pattern_id() != Some(pattern.id()) {
            return None;
        }
        Some(Self {
            pattern,
            subject,
            spans: region.iter().collect(),
        })
    }

    /// Number of groups including group 0.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, group: usize) -> Option<Span> {
        self.spans.get(group).copied().flatten()
    }

    pub fn get(&self, group: usize) -> Option<&'s [u8]> {
        self.span(group).map(|s| &self.subject[s.range()])
    }

    /// Bytes of the whole match.
    pub fn whole(&self) -> &'s [u8] {
        self.get(0).unwrap_or_default()
    }

    /// Span of the named group. With duplicate names the highest-numbered
    /// group that participated wins, the same rule the engine applies to
    /// `\k<name>` back-references.
    pub fn name_span(&self, name: &[u8]) -> Option<Span> {
        self.pattern
            .resolve_name(name)
            .iter()
            .rev()
            .find_map(|&idx| self.span(idx as usize))
    }

    pub fn name(&self, name: &[u8]) -> Option<&'s [u8]> {
        self.name_span(name).map(|s| &self.subject[s.range()])
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'s [u8]>> + '_ {
        (0..self.len()).map(move |group| self.get(group))
    }

    pub fn spans(&self) -> &[Option<Span>] {
        &self.spans
    }
}
