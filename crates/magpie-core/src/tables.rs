//! The immutable lookup data every position and search shares.

use std::sync::Arc;

use crate::attacks::AttackTables;
use crate::error::TableError;
use crate::zobrist::ZobristKeys;

/// Attack tables and Zobrist keys, built once per process and shared via
/// [`Arc`].
#[derive(Debug)]
pub struct Tables {
    pub attacks: AttackTables,
    pub zobrist: ZobristKeys,
}

impl Tables {
    pub fn new() -> Result<Tables, TableError> {
        Ok(Tables { attacks: AttackTables::new()?, zobrist: ZobristKeys::new() })
    }

    /// Build the tables and wrap them for sharing.
    pub fn shared() -> Result<Arc<Tables>, TableError> {
        Tables::new().map(Arc::new)
    }
}
