//! Mapeamento entre falhas de colaboradores externos e códigos de erro do census.
use crate::census::error::CensusError;
use crate::census::error_catalog::CensusErrorCode;
use crate::census::sources::SourceError;

/// Tipo de leitura externa que falhou; decide o código do erro.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadKind {
    /// Cotação de pool ou preço (o "oráculo").
    Quote,
    /// Saldo de token ou de LP.
    Balance,
    /// Preço de referência externo (camada de consistência).
    Reference,
}

/// Determina o código de erro para uma leitura externa que falhou.
pub fn code_for(read: ReadKind) -> CensusErrorCode {
    match read {
        ReadKind::Quote => CensusErrorCode::OracleUnavailable,
        ReadKind::Balance | ReadKind::Reference => CensusErrorCode::SourceUnavailable,
    }
}

/// Converte a falha de um colaborador em [`CensusError`], preservando o motivo.
pub fn from_source(read: ReadKind, source: &str, err: &SourceError) -> CensusError {
    CensusError::new(code_for(read))
        .with_context("source", source)
        .with_context("kind", err.kind.as_str())
        .with_context("detail", &err.detail)
}
