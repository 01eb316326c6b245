//! Registered code catalog.

use super::code::{is_constant, is_rotation_of};

/// Insertion-ordered set of cyclic codes a deployment recognizes.
///
/// Built once, then shared read-only (usually behind an `Arc`) by every
/// tracker. Catalog order matters: acquisition takes the first exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeCatalog {
    codes: Vec<u8>,
}

impl CodeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from codes in order; duplicates are dropped.
    pub fn from_codes<I: IntoIterator<Item = u8>>(codes: I) -> Self {
        let mut catalog = Self::new();
        for code in codes {
            catalog.insert(code);
        }
        catalog
    }

    /// Register a code. Returns `false` (and changes nothing) if the value
    /// is already registered.
    pub fn insert(&mut self, code: u8) -> bool {
        if self.codes.contains(&code) {
            return false;
        }
        if is_constant(code) {
            tracing::warn!("code {:#010b} has no transitions", code);
        }
        self.codes.push(code);
        true
    }

    /// First registered code equal to `observed`
    pub fn find(&self, observed: u8) -> Option<u8> {
        self.codes.iter().copied().find(|&c| c == observed)
    }

    /// Registered code at position `index`
    pub fn get(&self, index: usize) -> Option<u8> {
        self.codes.get(index).copied()
    }

    /// Registered codes in insertion order
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    /// Number of registered codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// No codes registered
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Pairs of entries `(earlier, later)` where one is a rotation of the other.
    ///
    /// A marker showing either code can acquire the other, so such pairs
    /// cannot be told apart.
    pub fn ambiguous_pairs(&self) -> Vec<(u8, u8)> {
        let mut pairs = Vec::new();
        for (i, &a) in self.codes.iter().enumerate() {
            for &b in &self.codes[i + 1..] {
                if is_rotation_of(a, b) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }
}
