//! Shared collector of resolved identifiers

use super::Identifier;
use std::sync::{Mutex, PoisonError};

/// Append-only set of identifiers resolved during a run
///
/// Concurrent resolver tasks append through a shared reference. Entries keep
/// completion order and are never modified or removed; the collection is
/// only read back once the run is over, through [`ResultSet::freeze`].
#[derive(Debug, Default)]
pub struct ResultSet {
    entries: Mutex<Vec<Identifier>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, identifier: Identifier) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identifier);
    }

    /// Ends the run and hands out the identifiers in completion order
    pub fn freeze(self) -> Vec<Identifier> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
