//! Per-candidate temporal decode state machine.
//!
//! A candidate is either locked onto a catalog code or searching for one.
//! While searching, the rolling code is compared against the catalog. While
//! locked, it must follow the predicted one-bit-per-frame rotation; a single
//! skipped rotation is absorbed, anything else drops the lock.

use super::catalog::CodeCatalog;
use super::code::rotate;
use std::sync::Arc;

/// Decode state carried by each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeState {
    /// Rolling window of the last eight binarized samples
    pub code: u8,
    /// Code predicted for the next frame; only written by the decoder
    pub next_code: u8,
    /// Locked onto a catalog code
    pub valid: bool,
    /// Catalog code from the last acquisition attempt, `None` after a miss.
    ///
    /// Not cleared when the lock is lost, so it can be stale while
    /// searching. Read it through [`DecodeState::identity`].
    pub match_code: Option<u8>,
}

impl DecodeState {
    /// Matched catalog code, only while locked
    pub fn identity(&self) -> Option<u8> {
        if self.valid { self.match_code } else { None }
    }
}

/// What one decode step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Searching candidate matched this catalog code
    Acquired(u8),
    /// Searching candidate matched nothing
    NoMatch,
    /// Locked candidate followed the predicted rotation
    Continued,
    /// Locked candidate was one rotation ahead of the prediction
    Skipped,
    /// Locked candidate matched neither prediction and is searching again
    Lost,
}

impl DecodeOutcome {
    /// Post-update lock flag
    pub fn is_locked(self) -> bool {
        !matches!(self, DecodeOutcome::NoMatch | DecodeOutcome::Lost)
    }
}

/// Runs acquisition and continuation against a shared catalog.
#[derive(Debug, Clone)]
pub struct TemporalDecoder {
    catalog: Arc<CodeCatalog>,
}

impl TemporalDecoder {
    /// Create a decoder over `catalog`
    pub fn new(catalog: Arc<CodeCatalog>) -> Self {
        Self { catalog }
    }

    /// Catalog this decoder acquires from
    pub fn catalog(&self) -> &CodeCatalog {
        &self.catalog
    }

    /// Fold the observed rolling code into `state`.
    pub fn update(&self, state: &mut DecodeState, observed: u8) -> DecodeOutcome {
        state.code = observed;
        if state.valid {
            self.continue_lock(state)
        } else {
            self.acquire(state)
        }
    }

    /// Like [`update`](Self::update) but only reports the lock flag.
    pub fn decode(&self, state: &mut DecodeState, observed: u8) -> bool {
        self.update(state, observed).is_locked()
    }

    fn acquire(&self, state: &mut DecodeState) -> DecodeOutcome {
        match self.catalog.find(state.code) {
            Some(matched) => {
                state.code = matched;
                state.match_code = Some(matched);
                state.next_code = rotate(matched);
                state.valid = true;
                DecodeOutcome::Acquired(matched)
            }
            None => {
                state.match_code = None;
                state.valid = false;
                DecodeOutcome::NoMatch
            }
        }
    }

    fn continue_lock(&self, state: &mut DecodeState) -> DecodeOutcome {
        let expected = state.next_code;
        let shifted = rotate(expected);
        if state.code == expected {
            state.next_code = shifted;
            DecodeOutcome::Continued
        } else if state.code == shifted {
            state.next_code = rotate(shifted);
            DecodeOutcome::Skipped
        } else {
            state.valid = false;
            DecodeOutcome::Lost
        }
    }
}
