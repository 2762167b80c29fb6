//! Host-facing pattern handle with explicit release.
//!
//! Rust callers simply drop a [`CompiledPattern`]. Hosts with their own object
//! lifecycle (Python, C callers) need `close()` semantics instead: release the
//! engine pattern now, then reject any later use. [`PatternHandle`] provides
//! that. Release is idempotent: the first call frees the pattern, later calls
//! only log. Operations on a released handle fail with
//! [`RegexError::Released`], never with a silent `NoMatch`.
//!
//! Thread-safe: all methods take `&self`. A match in flight holds its own
//! `Arc`, so releasing concurrently frees the engine pattern once that match
//! returns.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::compile::{compile, CompiledPattern};
use crate::error::{RegexError, Result};
use crate::matcher::{match_at, search, MatchOutcome};
use crate::options::{CompileOptions, SearchOptions};
use crate::region::MatchRegion;

pub struct PatternHandle {
    slot: RwLock<Option<Arc<CompiledPattern>>>,
}

impl PatternHandle {
    pub fn new(pattern: CompiledPattern) -> Self {
        Self::from_arc(Arc::new(pattern))
    }

    pub fn from_arc(pattern: Arc<CompiledPattern>) -> Self {
        Self {
            slot: RwLock::new(Some(pattern)),
        }
    }

    pub fn compile(pattern: &[u8], options: CompileOptions) -> Result<Self> {
        compile(pattern, options).map(Self::new)
    }

    /// The live pattern, or [`RegexError::Released`].
    pub fn get(&self) -> Result<Arc<CompiledPattern>> {
        self.slot.read().clone().ok_or(RegexError::Released)
    }

    /// Release the pattern. Returns `true` if this call released it.
    pub fn release(&self) -> bool {
        match self.slot.write().take() {
            Some(pattern) => {
                tracing::debug!(pattern_id = pattern.id(), "pattern handle released");
                true
            }
            None => {
                tracing::warn!("pattern handle released more than once; ignoring");
                false
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.slot.read().is_none()
    }

    pub fn search(
        &self,
        subject: &[u8],
        offset: usize,
        options: SearchOptions,
        region: &mut MatchRegion,
    ) -> Result<MatchOutcome> {
        let pattern = self.get()?;
        search(&pattern, subject, offset, options, region)
    }

    pub fn match_at(
        &self,
        subject: &[u8],
        offset: usize,
        options: SearchOptions,
        region: &mut MatchRegion,
    ) -> Result<MatchOutcome> {
        let pattern = self.get()?;
        match_at(&pattern, subject, offset, options, region)
    }

    pub fn resolve_name(&self, name: &[u8]) -> Result<Vec<u32>> {
        Ok(self.get()?.resolve_name(name).to_vec())
    }

    pub fn list_names(&self) -> Result<Vec<(Vec<u8>, u32)>> {
        Ok(self
            .get()?
            .list_names()
            .into_iter()
            .map(|(name, idx)| (name.to_vec(), idx))
            .collect())
    }

    pub fn group_count(&self) -> Result<usize> {
        Ok(self.get()?.group_count())
    }
}
