//! Parâmetros do census, lidos do ambiente com defaults.
//!
//! | variável | default |
//! |---|---|
//! | `CENSUS_SQUID_DUST_THRESHOLD` | `10_000_000` |
//! | `CENSUS_SQUILL_DUST_THRESHOLD` | `10_000_000` |
//! | `CENSUS_REFERENCE_QUANTITY` | `1e18` |

use super::dust::DustGuard;
use super::errors::{CensusErrorCode, Result};
use super::types::{PoolId, Wad, DEFAULT_DUST_THRESHOLD, DEFAULT_REFERENCE_QUANTITY};

pub const ENV_SQUID_DUST_THRESHOLD: &str = "CENSUS_SQUID_DUST_THRESHOLD";
pub const ENV_SQUILL_DUST_THRESHOLD: &str = "CENSUS_SQUILL_DUST_THRESHOLD";
pub const ENV_REFERENCE_QUANTITY: &str = "CENSUS_REFERENCE_QUANTITY";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CensusConfig {
    pub squid_dust_threshold: Wad,
    pub squill_dust_threshold: Wad,
    /// Quantidade usada por `squid_lp_rate()` / `squill_lp_rate()`.
    pub reference_quantity: Wad,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            squid_dust_threshold: DEFAULT_DUST_THRESHOLD,
            squill_dust_threshold: DEFAULT_DUST_THRESHOLD,
            reference_quantity: DEFAULT_REFERENCE_QUANTITY,
        }
    }
}

impl CensusConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual a [`from_env`](Self::from_env), com a fonte das variáveis injetada.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            squid_dust_threshold: parse_wad(ENV_SQUID_DUST_THRESHOLD, lookup(ENV_SQUID_DUST_THRESHOLD))?
                .unwrap_or(defaults.squid_dust_threshold),
            squill_dust_threshold: parse_wad(ENV_SQUILL_DUST_THRESHOLD, lookup(ENV_SQUILL_DUST_THRESHOLD))?
                .unwrap_or(defaults.squill_dust_threshold),
            reference_quantity: parse_wad(ENV_REFERENCE_QUANTITY, lookup(ENV_REFERENCE_QUANTITY))?
                .unwrap_or(defaults.reference_quantity),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_dust_threshold(mut self, pool: PoolId, threshold: Wad) -> Self {
        match pool {
            PoolId::SquidEth => self.squid_dust_threshold = threshold,
            PoolId::SquidSquill => self.squill_dust_threshold = threshold,
        }
        self
    }

    pub fn with_reference_quantity(mut self, quantity: Wad) -> Self {
        self.reference_quantity = quantity;
        self
    }

    /// A quantidade de referência precisa ser > 0 e não pode cair abaixo do maior
    /// piso de dust, senão `*_lp_rate()` devolveria 0.
    pub fn validate(&self) -> Result<()> {
        let floor = self.squid_dust_threshold.max(self.squill_dust_threshold);
        if self.reference_quantity == 0 || self.reference_quantity < floor {
            crate::census_bail!(
                CensusErrorCode::InvalidConfig,
                key => ENV_REFERENCE_QUANTITY,
                value => self.reference_quantity,
                min => floor.max(1),
            );
        }
        Ok(())
    }

    pub fn dust_guard(&self, pool: PoolId) -> DustGuard {
        match pool {
            PoolId::SquidEth => DustGuard::new(self.squid_dust_threshold),
            PoolId::SquidSquill => DustGuard::new(self.squill_dust_threshold),
        }
    }
}

/// Aceita decimal com `_` como separador (`10_000_000`).
fn parse_wad(key: &str, raw: Option<String>) -> Result<Option<Wad>> {
    let Some(raw) = raw else { return Ok(None) };
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    cleaned
        .parse::<Wad>()
        .map(Some)
        .map_err(|_| crate::census_err!(CensusErrorCode::InvalidConfig, key => key, value => raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = CensusConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, CensusConfig::default());
        assert_eq!(cfg.dust_guard(PoolId::SquidEth).threshold(), 10_000_000);
    }

    #[test]
    fn per_pool_thresholds_are_independent() {
        let cfg = CensusConfig::from_lookup(lookup_from(&[
            (ENV_SQUID_DUST_THRESHOLD, "1_000"),
            (ENV_SQUILL_DUST_THRESHOLD, " 20000000 "),
        ]))
        .unwrap();
        assert_eq!(cfg.dust_guard(PoolId::SquidEth).threshold(), 1_000);
        assert_eq!(cfg.dust_guard(PoolId::SquidSquill).threshold(), 20_000_000);
    }

    #[test]
    fn garbage_is_invalid_config() {
        let err = CensusConfig::from_lookup(lookup_from(&[(ENV_SQUILL_DUST_THRESHOLD, "-5")])).unwrap_err();
        assert_eq!(err.code, CensusErrorCode::InvalidConfig);
        assert_eq!(err.context.get("key").map(String::as_str), Some(ENV_SQUILL_DUST_THRESHOLD));
    }

    #[test]
    fn zero_reference_quantity_rejected() {
        let err = CensusConfig::from_lookup(lookup_from(&[(ENV_REFERENCE_QUANTITY, "0")])).unwrap_err();
        assert_eq!(err.code, CensusErrorCode::InvalidConfig);
    }

    #[test]
    fn builders() {
        let cfg = CensusConfig::default()
            .with_dust_threshold(PoolId::SquidSquill, 5)
            .with_reference_quantity(10);
        assert_eq!(cfg.squill_dust_threshold, 5);
        assert_eq!(cfg.squid_dust_threshold, DEFAULT_DUST_THRESHOLD);
        assert_eq!(cfg.reference_quantity, 10);
        // 10 < piso SQUID/ETH padrão
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn reference_quantity_below_dust_floor_rejected() {
        let err = CensusConfig::from_lookup(lookup_from(&[(ENV_REFERENCE_QUANTITY, "1000")])).unwrap_err();
        assert_eq!(err.code, CensusErrorCode::InvalidConfig);
        assert_eq!(err.context.get("key").map(String::as_str), Some(ENV_REFERENCE_QUANTITY));
        assert_eq!(err.context.get("min").map(String::as_str), Some("10000000"));

        // o maior dos dois pisos vale
        let err = CensusConfig::from_lookup(lookup_from(&[
            (ENV_SQUILL_DUST_THRESHOLD, "2_000_000_000_000_000_000"),
        ]))
        .unwrap_err();
        assert_eq!(err.context.get("min").map(String::as_str), Some("2000000000000000000"));
    }

    #[test]
    fn reference_quantity_at_dust_floor_accepted() {
        let cfg = CensusConfig::from_lookup(lookup_from(&[(ENV_REFERENCE_QUANTITY, "10_000_000")])).unwrap();
        assert_eq!(cfg.reference_quantity, DEFAULT_DUST_THRESHOLD);
        let lowered = CensusConfig::default()
            .with_dust_threshold(PoolId::SquidEth, 0)
            .with_dust_threshold(PoolId::SquidSquill, 0)
            .with_reference_quantity(1);
        assert!(lowered.validate().is_ok());
    }
}
