//! Search and anchored match.
//!
//! Both entry points run the engine against `subject[offset..]` semantics
//! while keeping offsets absolute: the engine sees the whole buffer (so
//! look-behind and `^` see the bytes before `offset`), but a match may not
//! start before `offset`.
//!
//! Under [`Encoding::Utf8`](crate::Encoding) the subject must be valid UTF-8;
//! anything else is rejected with [`RegexError::InvalidUtf8`] before the
//! engine sees it.

use crate::compile::CompiledPattern;
use crate::error::{RegexError, Result};
use crate::options::SearchOptions;
use crate::region::MatchRegion;

/// Result of a match attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The region holds spans for the whole match and every group.
    Matched,
    /// No match; the region holds nothing readable.
    NoMatch,
}

impl MatchOutcome {
    pub fn is_matched(self) -> bool {
        self == MatchOutcome::Matched
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Search,
    Anchored,
}

/// Find the leftmost match starting at or after `offset`.
pub fn search(
    pattern: &CompiledPattern,
    subject: &[u8],
    offset: usize,
    options: SearchOptions,
    region: &mut MatchRegion,
) -> Result<MatchOutcome> {
    check_subject(pattern, subject, region)?;
    run(Mode::Search, pattern, subject, offset, options, region)
}

/// Match only if the pattern matches beginning exactly at `offset`.
pub fn match_at(
    pattern: &CompiledPattern,
    subject: &[u8],
    offset: usize,
    options: SearchOptions,
    region: &mut MatchRegion,
) -> Result<MatchOutcome> {
    check_subject(pattern, subject, region)?;
    run(Mode::Anchored, pattern, subject, offset, options, region)
}

/// [`search`] for a subject already accepted by [`check_subject`]. Lets
/// iterators validate once instead of once per match.
pub(crate) fn search_checked(
    pattern: &CompiledPattern,
    subject: &[u8],
    offset: usize,
    region: &mut MatchRegion,
) -> Result<MatchOutcome> {
    run(Mode::Search, pattern, subject, offset, SearchOptions::empty(), region)
}

pub(crate) fn check_subject(
    pattern: &CompiledPattern,
    subject: &[u8],
    region: &mut MatchRegion,
) -> Result<()> {
    pattern.encoding().validate("subject", subject).inspect_err(|_| {
        region.invalidate();
    })
}

fn run(
    mode: Mode,
    pattern: &CompiledPattern,
    subject: &[u8],
    offset: usize,
    options: SearchOptions,
    region: &mut MatchRegion,
) -> Result<MatchOutcome> {
    if offset > subject.len() {
        region.invalidate();
        return Err(RegexError::OffsetOutOfRange {
            offset,
            len: subject.len(),
        });
    }

    let raw = region.prepare(pattern);
    let chars = pattern.encode(subject);
    let param = pattern.limits().to_param();
    let result = match mode {
        Mode::Search => pattern.regex().search_with_param(
            chars,
            offset,
            subject.len(),
            options.to_onig(),
            Some(raw),
            param,
        ),
        Mode::Anchored => {
            pattern
                .regex()
                .match_with_param(chars, offset, options.to_onig(), Some(raw), param)
        }
    };

    match result {
        Ok(Some(_)) => {
            region.commit();
            debug_assert_eq!(region.len(), pattern.group_count() + 1);
            tracing::trace!(
                pattern_id = pattern.id(),
                ?mode,
                offset,
                span = ?region.whole(),
                "matched"
            );
            Ok(MatchOutcome::Matched)
        }
        Ok(None) => {
            tracing::trace!(pattern_id = pattern.id(), ?mode, offset, "no match");
            Ok(MatchOutcome::NoMatch)
        }
        Err(e) => {
            let err = RegexError::Engine(e.into());
            tracing::debug!(pattern_id = pattern.id(), ?mode, offset, error = %err, "engine failure");
            Err(err)
        }
    }
}

impl CompiledPattern {
    /// See [`search`].
    pub fn search(
        &self,
        subject: &[u8],
        offset: usize,
        options: SearchOptions,
        region: &mut MatchRegion,
    ) -> Result<MatchOutcome> {
        search(self, subject, offset, options, region)
    }

    /// See [`match_at`].
    pub fn match_at(
        &self,
        subject: &[u8],
        offset: usize,
        options: SearchOptions,
        region: &mut MatchRegion,
    ) -> Result<MatchOutcome> {
        match_at(self, subject, offset, options, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{compile, MatchLimits, PatternBuilder};
    use crate::options::{CompileOptions, Encoding};
    use crate::region::Span;

    fn pat(p: &str) -> CompiledPattern {
        compile(p.as_bytes(), CompileOptions::empty()).unwrap()
    }

    #[test]
    fn search_fills_whole_and_groups() {
        let p = pat(r"(?<year>\d{4})-(?<month>\d{2})");
        let mut region = MatchRegion::new();
        let out = search(&p, b"2024-06", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(out, MatchOutcome::Matched);
        assert_eq!(region.len(), 3);
        assert_eq!(region.whole(), Some(Span::new(0, 7)));
        assert_eq!(region.get(1), Some(Span::new(0, 4)));
        assert_eq!(region.get(2), Some(Span::new(5, 7)));
        assert_eq!(region.get(3), None);
    }

    #[test]
    fn search_does_not_start_before_offset() {
        let p = pat("abc");
        let mut region = MatchRegion::new();
        let out = search(&p, b"xxabcxx", 3, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(out, MatchOutcome::NoMatch);
        assert_eq!(region.whole(), None);

        let out = search(&p, b"xxabcxx", 2, SearchOptions::empty(), &mut region).unwrap();
        assert!(out.is_matched());
        assert_eq!(region.whole(), Some(Span::new(2, 5)));
    }

    #[test]
    fn match_at_is_anchored() {
        let p = pat("abc");
        let mut region = MatchRegion::new();
        let subject = b"xxabcxx";
        assert_eq!(
            match_at(&p, subject, 0, SearchOptions::empty(), &mut region).unwrap(),
            MatchOutcome::NoMatch
        );
        assert_eq!(
            match_at(&p, subject, 2, SearchOptions::empty(), &mut region).unwrap(),
            MatchOutcome::Matched
        );
        assert_eq!(region.whole(), Some(Span::new(2, 5)));
    }

    #[test]
    fn offset_past_end_is_contract_violation() {
        let p = pat("a");
        let mut region = MatchRegion::new();
        let err = search(&p, b"abc", 4, SearchOptions::empty(), &mut region).unwrap_err();
        assert!(matches!(
            err,
            RegexError::OffsetOutOfRange { offset: 4, len: 3 }
        ));
        assert!(match_at(&p, b"abc", 4, SearchOptions::empty(), &mut region).is_err());
    }

    #[test]
    fn offset_equal_to_len_is_valid() {
        let p = pat("$");
        let mut region = MatchRegion::new();
        let out = search(&p, b"abc", 3, SearchOptions::empty(), &mut region).unwrap();
        assert!(out.is_matched());
        assert_eq!(region.whole(), Some(Span::new(3, 3)));
    }

    #[test]
    fn unmatched_optional_group_is_none_not_zero() {
        let p = pat("(a)?(b)");
        let mut region = MatchRegion::new();
        search(&p, b"b", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.get(1), None);
        assert_eq!(region.get(2), Some(Span::new(0, 1)));
        assert_eq!(region.to_offsets(), vec![0, 1, -1, -1, 0, 1]);
    }

    #[test]
    fn region_is_overwritten_not_accumulated() {
        let p = pat("(a)|(b)");
        let mut region = MatchRegion::for_pattern(&p);
        search(&p, b"a", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.get(1), Some(Span::new(0, 1)));
        assert_eq!(region.get(2), None);

        search(&p, b"xb", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.get(1), None);
        assert_eq!(region.get(2), Some(Span::new(1, 2)));
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn no_match_invalidates_previous_contents() {
        let p = pat("a");
        let mut region = MatchRegion::new();
        search(&p, b"a", 0, SearchOptions::empty(), &mut region).unwrap();
        assert!(region.is_matched());
        search(&p, b"b", 0, SearchOptions::empty(), &mut region).unwrap();
        assert!(!region.is_matched());
        assert_eq!(region.whole(), None);
    }

    #[test]
    fn region_rebinds_to_a_different_pattern() {
        let three = pat("(a)(b)(c)");
        let one = pat("(x)");
        let mut region = MatchRegion::new();
        search(&three, b"abc", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.len(), 4);
        assert_eq!(region.pattern_id(), Some(three.id()));

        search(&one, b"x", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.pattern_id(), Some(one.id()));
        assert_eq!(region.len(), 2);
        assert_eq!(region.get(2), None);
    }

    #[test]
    fn offsets_are_bytes_not_chars() {
        let p = pat("b");
        let mut region = MatchRegion::new();
        let subject = "éb".as_bytes();
        search(&p, subject, 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.whole(), Some(Span::new(2, 3)));
    }

    #[test]
    fn truncated_utf8_subject_rejected_at_every_offset() {
        let p = pat(r"\w+|.");
        let mut region = MatchRegion::new();
        for ch in ["é", "世", "🎉"] {
            let full = format!("x{ch}y");
            let bytes = full.as_bytes();
            // Cut the multi-byte character after each of its inner bytes.
            for cut in 2..1 + ch.len() {
                let subject = &bytes[..cut];
                for offset in 0..=subject.len() {
                    for anchored in [false, true] {
                        let out = if anchored {
                            match_at(&p, subject, offset, SearchOptions::empty(), &mut region)
                        } else {
                            search(&p, subject, offset, SearchOptions::empty(), &mut region)
                        };
                        match out {
                            Err(RegexError::InvalidUtf8 { input, valid_up_to, len }) => {
                                assert_eq!(input, "subject");
                                assert_eq!(valid_up_to, 1);
                                assert_eq!(len, subject.len());
                            }
                            other => panic!("{subject:?} at {offset}: expected InvalidUtf8, got {other:?}"),
                        }
                        assert!(!region.is_matched());
                        assert_eq!(region.whole(), None);
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_subject_clears_previous_match() {
        let p = pat("a");
        let mut region = MatchRegion::for_pattern(&p);
        search(&p, b"a", 0, SearchOptions::empty(), &mut region).unwrap();
        assert!(region.is_matched());
        assert!(search(&p, b"a\xff", 0, SearchOptions::empty(), &mut region).is_err());
        assert!(!region.is_matched());
    }

    #[test]
    fn ascii_pattern_accepts_arbitrary_bytes() {
        let p = PatternBuilder::new()
            .encoding(Encoding::Ascii)
            .build(b"a.c")
            .unwrap();
        let mut region = MatchRegion::new();
        let out = search(&p, b"\xe4a\xffc\xe4", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(out, MatchOutcome::Matched);
        assert_eq!(region.whole(), Some(Span::new(1, 4)));
    }

    #[test]
    fn embedded_nul_in_subject() {
        let p = pat("b");
        let mut region = MatchRegion::new();
        search(&p, b"a\0b", 0, SearchOptions::empty(), &mut region).unwrap();
        assert_eq!(region.whole(), Some(Span::new(2, 3)));
    }

    #[test]
    fn notbol_disables_caret_at_start() {
        let p = pat("^a");
        let mut region = MatchRegion::new();
        assert!(search(&p, b"a", 0, SearchOptions::empty(), &mut region)
            .unwrap()
            .is_matched());
        assert!(!search(&p, b"a", 0, SearchOptions::NOTBOL, &mut region)
            .unwrap()
            .is_matched());
    }

    #[test]
    fn ignorecase_option_applies() {
        let p = compile(b"hello", CompileOptions::IGNORECASE).unwrap();
        let mut region = MatchRegion::new();
        assert!(p
            .search(b"say HeLLo", 0, SearchOptions::empty(), &mut region)
            .unwrap()
            .is_matched());
        assert_eq!(region.whole(), Some(Span::new(4, 9)));
    }

    #[test]
    fn retry_limit_surfaces_as_engine_failure() {
        let p = PatternBuilder::new()
            .limits(MatchLimits {
                retry_limit_in_match: Some(10),
                match_stack_limit: None,
            })
            .build(b"(a|aa)*c")
            .unwrap();
        let mut region = MatchRegion::new();
        // The trailing "c" keeps the engine's literal pre-scan from rejecting
        // the subject before any backtracking happens.
        let mut subject = vec![b'a'; 64];
        subject.extend_from_slice(b"xc");
        let err = search(&p, &subject, 0, SearchOptions::empty(), &mut region).unwrap_err();
        match err {
            RegexError::Engine(info) => {
                assert!(info.code() < 0);
                assert!(!info.message().is_empty());
            }
            other => panic!("expected Engine, got {:?}", other),
        }
        assert!(!region.is_matched());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::compile::compile;
    use crate::options::CompileOptions;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_search_is_leftmost_at_or_after_offset(
            subject in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c']), 0..40),
            offset_seed in 0usize..64,
        ) {
            let p = compile(b"ab", CompileOptions::empty()).unwrap();
            let offset = offset_seed % (subject.len() + 1);
            let mut region = MatchRegion::new();
            let out = search(&p, &subject, offset, SearchOptions::empty(), &mut region).unwrap();

            let expected = (offset..subject.len())
                .find(|&i| subject[i..].starts_with(b"ab"));
            match expected {
                Some(start) => {
                    prop_assert_eq!(out, MatchOutcome::Matched);
                    prop_assert_eq!(region.whole().map(|s| s.start), Some(start));
                }
                None => prop_assert_eq!(out, MatchOutcome::NoMatch),
            }
        }

        #[test]
        fn prop_anchored_positions_are_subset_of_search(
            subject in prop::collection::vec(prop::sample::select(vec![b'x', b'y', b'1', b'2']), 0..32),
        ) {
            let p = compile(br"\d+y?", CompileOptions::empty()).unwrap();
            let mut anchored = MatchRegion::new();
            let mut searched = MatchRegion::new();
            for offset in 0..=subject.len() {
                let a = match_at(&p, &subject, offset, SearchOptions::empty(), &mut anchored).unwrap();
                if a.is_matched() {
                    prop_assert_eq!(anchored.whole().map(|s| s.start), Some(offset));
                    let s = search(&p, &subject, offset, SearchOptions::empty(), &mut searched).unwrap();
                    prop_assert!(s.is_matched());
                    prop_assert_eq!(searched.whole().map(|s| s.start), Some(offset));
                }
            }
        }
    }
}
