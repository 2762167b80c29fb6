//! PyO3 bindings for the regex bridge.
//!
//! Exposes `Regex` as the primary Python-visible class. Patterns and subjects
//! are `bytes`; offsets are byte offsets. Matching is synchronous.

use parking_lot::Mutex;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::compile::PatternBuilder;
use crate::error::RegexError;
use crate::handle::PatternHandle;
use crate::matcher::MatchOutcome;
use crate::options::{CompileOptions, Encoding, SearchOptions, Syntax};
use crate::region::MatchRegion;

/// Engine failures -> RuntimeError; bad patterns and caller errors -> ValueError.
fn to_py_err(e: RegexError) -> PyErr {
    match e {
        RegexError::Engine(_) => PyRuntimeError::new_err(format!("{e}")),
        _ => PyValueError::new_err(format!("{e}")),
    }
}

type PySpans = Vec<Option<(usize, usize)>>;

fn spans(outcome: MatchOutcome, region: &MatchRegion) -> Option<PySpans> {
    match outcome {
        MatchOutcome::Matched => Some(region.iter().map(|s| s.map(|s| (s.start, s.end))).collect()),
        MatchOutcome::NoMatch => None,
    }
}

/// Compiled Oniguruma pattern exposed to Python.
///
/// Thread-safe: all methods take `&self`. `close()` releases the engine
/// pattern; any later call raises ValueError.
///
/// `search` / `match_at` reuse one region per object, so repeated calls do
/// not reallocate the group arrays.
#[pyclass(frozen, name = "Regex")]
pub struct PyRegex {
    handle: PatternHandle,
    region: Mutex<MatchRegion>,
}

#[pymethods]
impl PyRegex {
    /// Compile `pattern`.
    ///
    /// Args:
    ///     pattern: Pattern bytes.
    ///     options: OR of the module's OPTION_* constants.
    ///     syntax: "ruby" (default), "perl", "perl_ng", "java", "grep",
    ///         "emacs", "gnu_regex" or "posix_extended".
    ///     encoding: "utf8" (default) or "ascii".
    #[new]
    #[pyo3(signature = (pattern, options = 0, syntax = "ruby", encoding = "utf8"))]
    fn new(pattern: &[u8], options: u32, syntax: &str, encoding: &str) -> PyResult<Self> {
        let syntax = Syntax::parse(syntax)
            .ok_or_else(|| PyValueError::new_err(format!("invalid syntax: '{syntax}'")))?;
        let encoding = Encoding::parse(encoding)
            .ok_or_else(|| PyValueError::new_err(format!("invalid encoding: '{encoding}'")))?;
        let options = CompileOptions::from_raw(options).map_err(to_py_err)?;
        let pattern = PatternBuilder::new()
            .options(options)
            .syntax(syntax)
            .encoding(encoding)
            .build(pattern)
            .map_err(to_py_err)?;
        let region = MatchRegion::for_pattern(&pattern);
        Ok(Self {
            handle: PatternHandle::new(pattern),
            region: Mutex::new(region),
        })
    }

    /// Leftmost match at or after `offset`.
    ///
    /// Returns: list of (start, end) or None per group (group 0 first), or
    /// None when there is no match.
    #[pyo3(signature = (subject, offset = 0, options = 0))]
    fn search(&self, subject: &[u8], offset: usize, options: u32) -> PyResult<Option<PySpans>> {
        let options = SearchOptions::from_raw(options).map_err(to_py_err)?;
        let mut region = self.region.lock();
        let outcome = self
            .handle
            .search(subject, offset, options, &mut region)
            .map_err(to_py_err)?;
        Ok(spans(outcome, &region))
    }

    /// Match beginning exactly at `offset`. Same return shape as `search`.
    #[pyo3(signature = (subject, offset = 0, options = 0))]
    fn match_at(&self, subject: &[u8], offset: usize, options: u32) -> PyResult<Option<PySpans>> {
        let options = SearchOptions::from_raw(options).map_err(to_py_err)?;
        let mut region = self.region.lock();
        let outcome = self
            .handle
            .match_at(subject, offset, options, &mut region)
            .map_err(to_py_err)?;
        Ok(spans(outcome, &region))
    }

    /// (start, end) of every non-overlapping match.
    fn find_all(&self, subject: &[u8]) -> PyResult<Vec<(usize, usize)>> {
        let pattern = self.handle.get().map_err(to_py_err)?;
        let found = pattern.find_all(subject).map_err(to_py_err)?;
        Ok(found.into_iter().map(|s| (s.start, s.end)).collect())
    }

    /// Replace every match; template supports \0-\9, \k<name> and \\.
    fn replace_all<'py>(
        &self,
        py: Python<'py>,
        subject: &[u8],
        template: &[u8],
    ) -> PyResult<Bound<'py, PyBytes>> {
        let pattern = self.handle.get().map_err(to_py_err)?;
        let out = pattern.replace_all(subject, template).map_err(to_py_err)?;
        Ok(PyBytes::new(py, &out))
    }

    /// Group indices carrying `name` (empty list when undefined).
    fn resolve_name(&self, name: &[u8]) -> PyResult<Vec<u32>> {
        self.handle.resolve_name(name).map_err(to_py_err)
    }

    /// Every (name, index) pair; names are `bytes`.
    fn list_names<'py>(&self, py: Python<'py>) -> PyResult<Vec<(Bound<'py, PyBytes>, u32)>> {
        let names = self.handle.list_names().map_err(to_py_err)?;
        Ok(names
            .into_iter()
            .map(|(name, idx)| (PyBytes::new(py, &name), idx))
            .collect())
    }

    /// Number of capture groups (group 0 excluded).
    fn group_count(&self) -> PyResult<usize> {
        self.handle.group_count().map_err(to_py_err)
    }

    /// Release the engine pattern. Safe to call more than once.
    fn close(&self) {
        self.handle.release();
    }

    #[getter]
    fn closed(&self) -> bool {
        self.handle.is_released()
    }

    fn __repr__(&self) -> String {
        match self.handle.get() {
            Ok(p) => format!("Regex({:?})", String::from_utf8_lossy(p.as_bytes())),
            Err(_) => "Regex(<closed>)".to_string(),
        }
    }
}

/// Escape regex metacharacters in `literal`.
#[pyfunction]
pub fn quote_meta<'py>(py: Python<'py>, literal: &[u8]) -> Bound<'py, PyBytes> {
    PyBytes::new(py, &crate::replace::quote_meta(literal))
}
