//! Compile-time and search-time option sets, syntax and encoding selectors.
//!
//! Option bit values are Oniguruma's `ONIG_OPTION_*` values, so an integer
//! produced by an existing host keeps its meaning when passed through
//! [`CompileOptions::from_raw`] / [`SearchOptions::from_raw`].

use bitflags::bitflags;
use onig::{EncodedBytes, RegexOptions, SearchOptions as OnigSearchOptions};
use serde::Deserialize;

use crate::error::{RegexError, Result};

bitflags! {
    /// Flags applied when a pattern is compiled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompileOptions: u32 {
        /// Case-insensitive matching.
        const IGNORECASE = 1;
        /// Extended (free-spacing) syntax: whitespace ignored, `#` comments.
        const EXTEND = 1 << 1;
        /// `.` also matches newline (Ruby semantics).
        const MULTILINE = 1 << 2;
        /// `^` -> `\A`, `$` -> `\Z`.
        const SINGLELINE = 1 << 3;
        /// Report the longest match instead of the first.
        const FIND_LONGEST = 1 << 4;
        /// Ignore empty matches.
        const FIND_NOT_EMPTY = 1 << 5;
        /// Clear `SINGLELINE` when the syntax turns it on by default.
        const NEGATE_SINGLE_LINE = 1 << 6;
        /// Only named groups capture.
        const DONT_CAPTURE_GROUP = 1 << 7;
        /// Plain groups capture even when named groups are present.
        const CAPTURE_GROUP = 1 << 8;
    }
}

bitflags! {
    /// Flags applied to a single search / match call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SearchOptions: u32 {
        /// The subject start is not the beginning of a line.
        const NOTBOL = 1 << 9;
        /// The subject end is not the end of a line.
        const NOTEOL = 1 << 10;
    }
}

impl CompileOptions {
    /// Validate a raw option integer coming across the host boundary.
    pub fn from_raw(bits: u32) -> Result<Self> {
        if bits & SearchOptions::all().bits() != 0 {
            return Err(RegexError::InvalidOptions(format!(
                "search-time option bits {:#x} passed to compile",
                bits & SearchOptions::all().bits()
            )));
        }
        Self::from_bits(bits).ok_or_else(|| {
            RegexError::InvalidOptions(format!(
                "unrecognized compile option bits {:#x}",
                bits & !Self::all().bits()
            ))
        })
    }

    pub(crate) fn to_onig(self) -> RegexOptions {
        let mut out = RegexOptions::REGEX_OPTION_NONE;
        for (flag, onig_flag) in [
            (Self::IGNORECASE, RegexOptions::REGEX_OPTION_IGNORECASE),
            (Self::EXTEND, RegexOptions::REGEX_OPTION_EXTEND),
            (Self::MULTILINE, RegexOptions::REGEX_OPTION_MULTILINE),
            (Self::SINGLELINE, RegexOptions::REGEX_OPTION_SINGLELINE),
            (Self::FIND_LONGEST, RegexOptions::REGEX_OPTION_FIND_LONGEST),
            (Self::FIND_NOT_EMPTY, RegexOptions::REGEX_OPTION_FIND_NOT_EMPTY),
            (
                Self::NEGATE_SINGLE_LINE,
                RegexOptions::REGEX_OPTION_NEGATE_SINGLELINE,
            ),
            (
                Self::DONT_CAPTURE_GROUP,
                RegexOptions::REGEX_OPTION_DONT_CAPTURE_GROUP,
            ),
            (Self::CAPTURE_GROUP, RegexOptions::REGEX_OPTION_CAPTURE_GROUP),
        ] {
            if self.contains(flag) {
                out |= onig_flag;
            }
        }
        out
    }
}

impl SearchOptions {
    /// Validate a raw option integer coming across the host boundary.
    pub fn from_raw(bits: u32) -> Result<Self> {
        Self::from_bits(bits).ok_or_else(|| {
            RegexError::InvalidOptions(format!(
                "unrecognized search option bits {:#x}",
                bits & !Self::all().bits()
            ))
        })
    }

    pub(crate) fn to_onig(self) -> OnigSearchOptions {
        let mut out = OnigSearchOptions::SEARCH_OPTION_NONE;
        if self.contains(Self::NOTBOL) {
            out |= OnigSearchOptions::SEARCH_OPTION_NOTBOL;
        }
        if self.contains(Self::NOTEOL) {
            out |= OnigSearchOptions::SEARCH_OPTION_NOTEOL;
        }
        out
    }
}

/// Pattern syntax understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// Ruby syntax: named groups, duplicate names allowed.
    #[default]
    Ruby,
    Perl,
    /// Perl with named groups (Oniguruma's `Perl_NT` table).
    PerlNg,
    Java,
    Grep,
    Emacs,
    GnuRegex,
    PosixExtended,
}

impl Syntax {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ruby" => Some(Self::Ruby),
            "perl" => Some(Self::Perl),
            "perl_ng" => Some(Self::PerlNg),
            "java" => Some(Self::Java),
            "grep" => Some(Self::Grep),
            "emacs" => Some(Self::Emacs),
            "gnu_regex" => Some(Self::GnuRegex),
            "posix_extended" => Some(Self::PosixExtended),
            _ => None,
        }
    }

    pub(crate) fn to_onig(self) -> &'static onig::Syntax {
        match self {
            Self::Ruby => onig::Syntax::ruby(),
            Self::Perl => onig::Syntax::perl(),
            Self::PerlNg => onig::Syntax::perl_ng(),
            Self::Java => onig::Syntax::java(),
            Self::Grep => onig::Syntax::grep(),
            Self::Emacs => onig::Syntax::emacs(),
            Self::GnuRegex => onig::Syntax::gnu_regex(),
            Self::PosixExtended => onig::Syntax::posix_extended(),
        }
    }
}

/// Character encoding the engine uses for both the pattern and subjects.
///
/// Offsets are always byte offsets; the encoding only decides how the engine
/// groups bytes into characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
}

impl Encoding {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "utf8" | "utf-8" => Some(Self::Utf8),
            "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// The engine's static encoding table.
    pub(crate) fn raw(self) -> onig_sys::OnigEncoding {
        match self {
            Self::Utf8 => std::ptr::addr_of_mut!(onig_sys::OnigEncodingUTF8),
            Self::Ascii => std::ptr::addr_of_mut!(onig_sys::OnigEncodingASCII),
        }
    }

    /// Tag a byte buffer with this encoding for an engine call.
    ///
    /// Callers must have passed `bytes` through [`Encoding::validate`]: the
    /// UTF-8 tables trust lead bytes and would read past a truncated
    /// sequence at the end of the buffer.
    pub(crate) fn wrap(self, bytes: &[u8]) -> EncodedBytes<'_> {
        EncodedBytes::from_parts(bytes, self.raw())
    }

    /// Reject bytes the engine cannot walk safely in this encoding.
    ///
    /// ASCII is single-byte, so every buffer is accepted.
    pub(crate) fn validate(self, input: &'static str, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Ascii => Ok(()),
            Self::Utf8 => std::str::from_utf8(bytes).map(drop).map_err(|e| {
                RegexError::InvalidUtf8 {
                    input,
                    valid_up_to: e.valid_up_to(),
                    len: bytes.len(),
                }
            }),
        }
    }

    /// Width in bytes of the character starting at `at`, used to step past
    /// empty matches. Returns 1 at or past the end of `bytes`.
    pub(crate) fn char_len_at(self, bytes: &[u8], at: usize) -> usize {
        let Some(&lead) = bytes.get(at) else {
            return 1;
        };
        let width = match self {
            Self::Ascii => 1,
            Self::Utf8 => match lead {
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => 1,
            },
        };
        width.min(bytes.len() - at)
    }
}
