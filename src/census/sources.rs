//! Colaboradores externos consultados pelo census (token, pools, price feed).
//!
//! O engine só conhece estas interfaces; contratos on-chain, RPC e fixtures ficam
//! do lado de fora. Toda leitura é síncrona e ao vivo: nada aqui é cacheado.
use core::fmt;

use super::types::{Address, Asset, Wad};

/// Motivo pelo qual uma fonte externa recusou a leitura.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceErrorKind {
    /// A chamada reverteu (ex.: proteção de dust do próprio pool).
    Reverted,
    /// Pool sem liquidez para cotar.
    NoLiquidity,
    /// Fonte inacessível (RPC, rede, API).
    Unreachable,
}

impl SourceErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reverted => "reverted",
            Self::NoLiquidity => "no_liquidity",
            Self::Unreachable => "unreachable",
        }
    }
}

/// Falha reportada por um colaborador externo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub detail: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    pub fn reverted(detail: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Reverted, detail)
    }

    pub fn no_liquidity(detail: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NoLiquidity, detail)
    }

    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unreachable, detail)
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.detail)
    }
}

impl std::error::Error for SourceError {}

/// Token ERC20-like (`balanceOf`).
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, who: &Address) -> Result<Wad, SourceError>;
}

/// Pool de LP: saldo do LP token e cotação bruta (`get_dy`-like).
pub trait LpPool: Send + Sync {
    fn lp_balance_of(&self, who: &Address) -> Result<Wad, SourceError>;

    /// Quanto SQUID `lp_amount` unidades de LP representam (total, não taxa).
    fn quote(&self, lp_amount: Wad) -> Result<Wad, SourceError>;
}

/// Preço em USD escalado por 1e18.
pub trait PriceFeed: Send + Sync {
    fn price(&self, asset: Asset) -> Result<Wad, SourceError>;
}

impl<T: TokenLedger + ?Sized> TokenLedger for &T {
    fn balance_of(&self, who: &Address) -> Result<Wad, SourceError> {
        (**self).balance_of(who)
    }
}

impl<P: LpPool + ?Sized> LpPool for &P {
    fn lp_balance_of(&self, who: &Address) -> Result<Wad, SourceError> {
        (**self).lp_balance_of(who)
    }

    fn quote(&self, lp_amount: Wad) -> Result<Wad, SourceError> {
        (**self).quote(lp_amount)
    }
}

impl<F: PriceFeed + ?Sized> PriceFeed for &F {
    fn price(&self, asset: Asset) -> Result<Wad, SourceError> {
        (**self).price(asset)
    }
}
