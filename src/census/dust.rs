//! DustGuard: piso absoluto em unidades de LP antes de confiar em qualquer taxa.
//!
//! Política, em ordem:
//! 1. saldo zero → 0, sem chamar o oráculo;
//! 2. saldo abaixo do `threshold` → 0, sem chamar o oráculo;
//! 3. senão `floor(saldo * rate / 1e18)` com a taxa de [`quote_rate`].
//!
//! O piso é em LP e não em USD: um piso em USD se moveria junto com o preço.

use tracing::{debug, warn};

use super::errors::Result;
use super::guardrails::mul_div_floor;
use super::oracle::quote_rate;
use super::sources::LpPool;
use super::types::{PoolId, Wad, DEFAULT_DUST_THRESHOLD, WAD};
use crate::obs::wrap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DustGuard {
    threshold: Wad,
}

impl Default for DustGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DUST_THRESHOLD)
    }
}

impl DustGuard {
    /// `threshold = 0` desliga o piso; só o curto-circuito do zero continua valendo.
    pub const fn new(threshold: Wad) -> Self {
        Self { threshold }
    }

    pub const fn threshold(&self) -> Wad {
        self.threshold
    }

    #[inline]
    pub const fn is_dust(&self, lp_amount: Wad) -> bool {
        lp_amount < self.threshold
    }

    /// Taxa por LP protegida: 0 para quantidade zero ou dust, senão a taxa do oráculo.
    pub fn guarded_rate<P>(&self, pool_id: PoolId, pool: &P, lp_amount: Wad) -> Result<Wad>
    where
        P: LpPool + ?Sized,
    {
        if lp_amount == 0 {
            return Ok(0);
        }
        if self.is_dust(lp_amount) {
            warn!(pool = %pool_id, lp_amount, threshold = self.threshold, "saldo de LP abaixo do piso de dust");
            wrap::count_dust(pool_id.name());
            return Ok(0);
        }
        quote_rate(pool_id, pool, lp_amount)
    }

    /// Equivalente em SQUID de `lp_balance`, truncado.
    pub fn guarded_equivalent<P>(&self, pool_id: PoolId, pool: &P, lp_balance: Wad) -> Result<Wad>
    where
        P: LpPool + ?Sized,
    {
        let rate = self.guarded_rate(pool_id, pool, lp_balance)?;
        if rate == 0 {
            return Ok(0);
        }
        let squid = mul_div_floor(lp_balance, rate, WAD)
            .map_err(|err| err.with_context("pool", pool_id).with_context("lp_balance", lp_balance))?;
        debug!(pool = %pool_id, lp_balance, rate, squid, "equivalente de LP");
        Ok(squid)
    }
}
