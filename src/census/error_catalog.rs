//! Catálogo imutável de erros do census.
use core::fmt;

/// Código de erro do census.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CensusErrorCode {
    /// Oráculo de taxa chamado com quantidade zero (erro de programação).
    ZeroQuantity,
    /// Pool ou price feed rejeitou a consulta.
    OracleUnavailable,
    /// Overflow ou underflow em cálculos numéricos.
    OverflowNumeric,
    /// Leitura de saldo (token ou LP) ou de preço de referência falhou.
    SourceUnavailable,
    /// Valor de configuração inválido.
    InvalidConfig,
    /// Argumento fora do domínio de uma checagem (ex.: base zero).
    InvalidInput,
}

impl CensusErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ZeroQuantity => "CEN-0001",
            Self::OracleUnavailable => "CEN-0002",
            Self::OverflowNumeric => "CEN-0003",
            Self::SourceUnavailable => "CEN-0004",
            Self::InvalidConfig => "CEN-0005",
            Self::InvalidInput => "CEN-0006",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ZeroQuantity => "Quantidade zerada",
            Self::OracleUnavailable => "Preço indisponível",
            Self::OverflowNumeric => "Overflow numérico",
            Self::SourceUnavailable => "Fonte indisponível",
            Self::InvalidConfig => "Configuração inválida",
            Self::InvalidInput => "Entrada inválida",
        }
    }

    /// Mensagem base em português (aceita placeholders `{chave}` do contexto).
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::ZeroQuantity => "quantity deve ser > 0 para cotar {pool}",
            Self::OracleUnavailable => "oráculo {source} rejeitou a consulta",
            Self::OverflowNumeric => "overflow/underflow numérico",
            Self::SourceUnavailable => "leitura de {source} falhou",
            Self::InvalidConfig => "valor inválido para {key}",
            Self::InvalidInput => "entrada inválida para {op}",
        }
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [CensusErrorCode] {
        const ALL: &[CensusErrorCode] = &[
            CensusErrorCode::ZeroQuantity,
            CensusErrorCode::OracleUnavailable,
            CensusErrorCode::OverflowNumeric,
            CensusErrorCode::SourceUnavailable,
            CensusErrorCode::InvalidConfig,
            CensusErrorCode::InvalidInput,
        ];
        ALL
    }
}

impl fmt::Display for CensusErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: CensusErrorCode) -> &'static str {
    code.message_pt()
}
