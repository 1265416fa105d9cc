//! Compat: reexporta o módulo de erros unificado.

pub use super::error::{CensusError, Result};
pub use super::error_catalog::{default_locale_message, CensusErrorCode};
pub use super::error_map::{code_for, from_source, ReadKind};
