//! Tipos básicos do census (escala fixa WAD) + U256 para intermediários.

use core::fmt;

use uint::construct_uint;
construct_uint! {
    /// Inteiro de 256 bits para contas intermediárias seguras.
    pub struct U256(4);
}

/// Endereço opaco de 20 bytes; o engine só interpreta igualdade e o endereço zero.
pub type Address = primitive_types::H160;

pub type Wad = u128; // escala 1e18
pub type Ppm = u32;  // 0..=1_000_000

pub const WAD: Wad = 1_000_000_000_000_000_000u128; // 1e18
pub const PPM_SCALE: Ppm = 1_000_000;                // 1e6 (ppm)

/// Piso de dust observado no sistema de referência (em unidades de LP, não USD).
pub const DEFAULT_DUST_THRESHOLD: Wad = 10_000_000;

/// Quantidade padrão para consultar a taxa "por LP" (1 LP token inteiro).
pub const DEFAULT_REFERENCE_QUANTITY: Wad = WAD;

/// Pools de LP que entram no cálculo do poder de voto.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PoolId {
    /// LP SQUID/ETH.
    SquidEth,
    /// LP SQUID/SQUILL.
    SquidSquill,
}

impl PoolId {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SquidEth => "squid_eth",
            Self::SquidSquill => "squid_squill",
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ativos com preço em USD exposto pelo PriceView.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Eth,
    Squid,
    Squill,
}

impl Asset {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eth => "ETH",
            Self::Squid => "SQUID",
            Self::Squill => "SQUILL",
        }
    }

    pub fn all() -> &'static [Asset] {
        const ALL: &[Asset] = &[Asset::Eth, Asset::Squid, Asset::Squill];
        ALL
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_and_asset_names_are_stable() {
        assert_eq!(PoolId::SquidEth.to_string(), "squid_eth");
        assert_eq!(PoolId::SquidSquill.to_string(), "squid_squill");
        assert_eq!(Asset::all().len(), 3);
        assert_eq!(Asset::Squill.to_string(), "SQUILL");
    }

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::zero().is_zero());
        assert!(!Address::from_low_u64_be(1).is_zero());
    }
}
