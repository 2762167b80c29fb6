//! `nexus_regex`: Oniguruma bridge for Nexus.
//!
//! Compiles patterns over raw bytes, runs search / anchored match into a
//! caller-owned reusable region, and resolves named captures (a name may map
//! to several group indices).
//!
//! Modules:
//! - `compile` : pattern compilation, `CompiledPattern`, `PatternBuilder`
//! - `region`  : reusable `MatchRegion` and `Span`
//! - `matcher` : `search` / `match_at`
//! - `names`   : capture-name table, `resolve_name` / `list_names`
//! - `captures`: capture snapshots
//! - `find`    : find / find_all / iterators
//! - `replace` : replace_all, split, quote_meta
//! - `cache`   : LRU cache of compiled patterns
//! - `handle`  : releasable host-facing handle
//! - `config`  : JSON pattern config
//!
//! ```no_run
//! use _nexus_regex::{compile, CompileOptions, MatchRegion, SearchOptions};
//!
//! let p = compile(br"(?<year>\d{4})-(?<month>\d{2})", CompileOptions::empty())?;
//! let mut region = MatchRegion::for_pattern(&p);
//! if p.search(b"2024-06", 0, SearchOptions::empty(), &mut region)?.is_matched() {
//!     let year = p.resolve_name(b"year")[0] as usize;
//!     assert_eq!(region.get(year).map(|s| s.range()), Some(0..4));
//! }
//! # Ok::<(), _nexus_regex::RegexError>(())
//! ```

pub mod cache;
pub mod captures;
pub mod compile;
pub mod config;
pub mod error;
pub mod find;
pub mod handle;
pub mod matcher;
pub mod names;
pub mod options;
#[cfg(feature = "python")]
pub mod pyo3_bindings;
pub mod region;
pub mod replace;

pub use cache::PatternCache;
pub use captures::Captures;
pub use compile::{compile, CompiledPattern, MatchLimits, PatternBuilder};
pub use config::{parse_regex_config, RegexConfig};
pub use error::{ErrorInfo, RegexError, Result};
pub use handle::PatternHandle;
pub use matcher::{match_at, search, MatchOutcome};
pub use names::{list_names, resolve_name, CaptureNameEntry, NameTable};
pub use options::{CompileOptions, Encoding, SearchOptions, Syntax};
pub use region::{MatchRegion, Span};
pub use replace::{quote_meta, replace_all, replace_all_with, split};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module: _nexus_regex
#[cfg(feature = "python")]
#[pymodule]
fn _nexus_regex(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<pyo3_bindings::PyRegex>()?;
    m.add_function(wrap_pyfunction!(pyo3_bindings::quote_meta, m)?)?;
    for (name, flag) in CompileOptions::all().iter_names() {
        m.add(format!("OPTION_{name}"), flag.bits())?;
    }
    for (name, flag) in SearchOptions::all().iter_names() {
        m.add(format!("OPTION_{name}"), flag.bits())?;
    }
    Ok(())
}
