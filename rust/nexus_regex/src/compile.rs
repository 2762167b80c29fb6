//! Pattern compilation.
//!
//! [`CompiledPattern`] owns the engine regex. The engine allocation is freed
//! when the pattern is dropped, so every exit path (including a failed
//! compile, where no handle is ever produced) releases it exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use onig::{EncodedBytes, MatchParam, Regex};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{ErrorInfo, RegexError, Result};
use crate::names::NameTable;
use crate::options::{CompileOptions, Encoding, Syntax};

/// Source of pattern identities; regions remember which pattern filled them.
static NEXT_PATTERN_ID: AtomicU64 = AtomicU64::new(1);

/// Serializes direct `onig_new` calls made outside the safe wrapper.
static RAW_COMPILE: Mutex<()> = parking_lot::const_mutex(());

/// Code the safe wrapper substitutes when it cannot decode an engine message.
const ONIG_MISMATCH: i32 = onig_sys::ONIG_MISMATCH as i32;

/// Backtracking limits forwarded to the engine on every match call.
///
/// `None` keeps the engine default. Exceeding a limit makes the match call
/// return [`RegexError::Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default)]
pub struct MatchLimits {
    pub retry_limit_in_match: Option<u32>,
    pub match_stack_limit: Option<u32>,
}

impl MatchLimits {
    pub(crate) fn to_param(self) -> MatchParam {
        let mut param = MatchParam::default();
        if let Some(limit) = self.retry_limit_in_match {
            param.set_retry_limit_in_match(limit);
        }
        if let Some(limit) = self.match_stack_limit {
            param.set_match_stack_limit(limit);
        }
        param
    }
}

/// Compiled pattern: engine regex plus its static group metadata.
pub struct CompiledPattern {
    id: u64,
    regex: Regex,
    pattern: Vec<u8>,
    options: CompileOptions,
    syntax: Syntax,
    encoding: Encoding,
    limits: MatchLimits,
    names: NameTable,
}

impl CompiledPattern {
    /// Identity of this pattern, unique for the process lifetime.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Pattern source bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pattern
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn limits(&self) -> MatchLimits {
        self.limits
    }

    /// Number of capture groups, not counting the whole-match group 0.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len()
    }

    /// Static name -> indices table.
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Group indices sharing `name`; empty when undefined.
    pub fn resolve_name(&self, name: &[u8]) -> &[u32] {
        self.names.resolve(name)
    }

    /// Every (name, index) pair of the pattern.
    pub fn list_names(&self) -> Vec<(&[u8], u32)> {
        self.names.list()
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Tag `subject` with this pattern's encoding for an engine call.
    pub(crate) fn encode<'s>(&self, subject: &'s [u8]) -> EncodedBytes<'s> {
        self.encoding.wrap(subject)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("id", &self.id)
            .field("pattern", &String::from_utf8_lossy(&self.pattern))
            .field("options", &self.options)
            .field("syntax", &self.syntax)
            .field("encoding", &self.encoding)
            .field("groups", &self.group_count())
            .finish()
    }
}

/// Builder for patterns that need more than the default syntax/encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternBuilder {
    options: CompileOptions,
    syntax: Syntax,
    encoding: Encoding,
    limits: MatchLimits,
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternBuilder {
    pub fn new() -> Self {
        Self {
            options: CompileOptions::empty(),
            syntax: Syntax::default(),
            encoding: Encoding::default(),
            limits: MatchLimits::default(),
        }
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn limits(mut self, limits: MatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Compile `pattern` with the configured settings.
    pub fn build(&self, pattern: &[u8]) -> Result<CompiledPattern> {
        self.encoding.validate("pattern", pattern)?;
        let regex = Regex::with_options_and_encoding(
            self.encoding.wrap(pattern),
            self.options.to_onig(),
            self.syntax.to_onig(),
        )
        .map_err(|e| {
            let info = if e.code() == ONIG_MISMATCH {
                self.raw_compile_error(pattern)
                    .unwrap_or_else(|| ErrorInfo::from(e))
            } else {
                ErrorInfo::from(e)
            };
            tracing::debug!(
                code = info.code(),
                error = %info,
                pattern_len = pattern.len(),
                "pattern rejected by engine"
            );
            RegexError::Compile(info)
        })?;

        let names = NameTable::from_regex(&regex);
        let id = NEXT_PATTERN_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            id,
            groups = regex.captures_len(),
            names = names.len(),
            syntax = ?self.syntax,
            encoding = ?self.encoding,
            "pattern compiled"
        );

        Ok(CompiledPattern {
            id,
            regex,
            pattern: pattern.to_vec(),
            options: self.options,
            syntax: self.syntax,
            encoding: self.encoding,
            limits: self.limits,
            names,
        })
    }
}

impl PatternBuilder {
    /// Re-run a failed compile through the C API to read the real error code
    /// and the raw message bytes.
    ///
    /// The safe wrapper reports a message that is not UTF-8 (the engine
    /// quotes pattern bytes into it) as a generic error with code
    /// `ONIG_MISMATCH`. Returns `None` if the second attempt does not fail.
    fn raw_compile_error(&self, pattern: &[u8]) -> Option<ErrorInfo> {
        let _guard = RAW_COMPILE.lock();
        let mut raw: onig_sys::OnigRegex = std::ptr::null_mut();
        let mut einfo = onig_sys::OnigErrorInfo {
            enc: std::ptr::null_mut(),
            par: std::ptr::null_mut(),
            par_end: std::ptr::null_mut(),
        };
        let range = pattern.as_ptr_range();
        let syntax = self.syntax.to_onig() as *const onig::Syntax as *mut onig_sys::OnigSyntaxType;
        // SAFETY: `range` covers `pattern`, which outlives the call. Syntax and
        // encoding point at the engine's static tables. The engine only
        // writes `raw` and `einfo`.
        let code = unsafe {
            onig_sys::onig_new(
                &mut raw,
                range.start,
                range.end,
                self.options.to_onig().bits(),
                self.encoding.raw(),
                syntax,
                &mut einfo,
            )
        };
        if code == onig_sys::ONIG_NORMAL as i32 {
            // SAFETY: `raw` was allocated by the successful `onig_new` above.
            unsafe { onig_sys::onig_free(raw) };
            return None;
        }

        let mut buf = [0u8; onig_sys::ONIG_MAX_ERROR_MESSAGE_LEN as usize];
        // SAFETY: `buf` holds ONIG_MAX_ERROR_MESSAGE_LEN bytes, the most the
        // engine writes. `einfo` still points into `pattern`.
        let len = unsafe {
            onig_sys::onig_error_code_to_str(
                buf.as_mut_ptr(),
                code,
                &einfo as *const onig_sys::OnigErrorInfo,
            )
        };
        let len = usize::try_from(len).ok()?.min(buf.len());
        Some(ErrorInfo::new(code, buf[..len].to_vec()))
    }
}

/// Compile `pattern` with Ruby syntax and UTF-8 encoding.
pub fn compile(pattern: &[u8], options: CompileOptions) -> Result<CompiledPattern> {
    PatternBuilder::new().options(options).build(pattern)
}
