//! Symbol interning.
//!
//! Assigns a small, stable integer id to every distinct identifier spelling
//! encountered while parsing a program. Using dense integers as frame
//! indices makes variable lookup O(1) and avoids per-lookup string hashing
//! once parsing is complete.
//!
//! Unlike a general-purpose string interner meant for concurrent use, this
//! one lives for the duration of a single parse and is never shared across
//! threads, so a plain `HashMap` plus a reverse `Vec` is all that's needed.

use std::collections::HashMap;

/// A stable identifier for an interned spelling, used as a frame slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Maps identifier spellings to dense integer ids and back.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: HashMap<String, SymbolId>,
    names: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, interning it if this is the first occurrence.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Looks up the spelling behind a symbol id, for diagnostics.
    pub fn name_of(&self, id: SymbolId) -> &str {
        &self.names[id.0 as usize]
    }
}
