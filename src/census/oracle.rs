//! Adaptador de taxa: transforma a cotação bruta do pool em **SQUID por 1 LP** (WAD).
//!
//! `rate = floor(pool.quote(q) * 1e18 / q)`. A normalização torna o resultado
//! invariante à quantidade consultada; quem multiplica pelo saldo não conta a
//! escala duas vezes. Falhas do pool sobem como `OracleUnavailable`, sem retry e
//! sem taxa padrão.

use tracing::{debug, warn};

use super::error_map::{from_source, ReadKind};
use super::errors::{CensusErrorCode, Result};
use super::guardrails::mul_div_floor;
use super::sources::LpPool;
use super::types::{PoolId, Wad, WAD};
use crate::obs::wrap;

/// Cota `quantity` unidades de LP em `pool` e devolve a taxa por LP token.
///
/// `quantity == 0` é erro de programação (`ZeroQuantity`): o caso de domínio
/// "saldo zero" é resolvido antes, no [`DustGuard`](super::dust::DustGuard).
pub fn quote_rate<P>(pool_id: PoolId, pool: &P, quantity: Wad) -> Result<Wad>
where
    P: LpPool + ?Sized,
{
    if quantity == 0 {
        crate::census_bail!(CensusErrorCode::ZeroQuantity, pool => pool_id);
    }
    let out = pool.quote(quantity).map_err(|err| {
        warn!(pool = %pool_id, quantity, error = %err, "cotação rejeitada pelo pool");
        wrap::count_oracle_failure(pool_id.name());
        from_source(ReadKind::Quote, pool_id.name(), &err)
    })?;
    let rate = mul_div_floor(out, WAD, quantity)
        .map_err(|err| err.with_context("pool", pool_id).with_context("quantity", quantity))?;
    debug!(pool = %pool_id, quantity, out, rate, "taxa normalizada");
    Ok(rate)
}
