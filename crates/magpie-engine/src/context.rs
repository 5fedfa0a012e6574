//! Read-only tables shared by everything that searches or evaluates.

use std::sync::Arc;

use magpie_core::{Position, Tables};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::eval::Bitbases;

/// Attack tables, Zobrist keys and endgame bitbases, built once and
/// shared by `Arc`.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub tables: Arc<Tables>,
    pub bitbases: Arc<Bitbases>,
}

impl EngineContext {
    /// Build the attack tables and load the bitbases from
    /// `config.bitbase_dir`, or generate them when no directory is set.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let tables = Tables::shared()?;
        let bitbases = match &config.bitbase_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "loading bitbases");
                Arc::new(Bitbases::load(dir)?)
            }
            None => Bitbases::builtin(),
        };
        Ok(Self { tables, bitbases })
    }

    pub fn start_position(&self) -> Position {
        Position::start(self.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BitbaseError;

    #[test]
    fn default_context_uses_generated_bitbases() {
        let ctx = EngineContext::new(&EngineConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&ctx.bitbases, &Bitbases::builtin()));
        assert_eq!(ctx.start_position().to_fen(), magpie_core::START_FEN);
    }

    #[test]
    fn missing_bitbase_dir_fails() {
        let config = EngineConfig::default().with_bitbase_dir("/nonexistent/magpie-bitbases");
        let err = EngineContext::new(&config).unwrap_err();
        assert!(matches!(err, EngineError::Bitbase(BitbaseError::Io { .. })));
    }
}
