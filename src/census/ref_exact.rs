//! Referência de alta precisão (**BigUint/BigRational**) para o equivalente em SQUID
//! de um saldo de LP.
//!
//! - *política*: repete em precisão arbitrária o que o core faz
//!   (`rate = floor(out·1e18/q)`, depois `floor(q·rate/1e18)`); deve bater 1:1.
//! - *exato*: `q · (out/q) = out`, sem quantização.
//! - *limite de truncamento*: `exato − core ≤ floor(q/1e18) + 1`.
//!
//! Só para testes e goldens; não entra no caminho de produção.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use super::dust::DustGuard;
use super::error_map::{from_source, ReadKind};
use super::errors::{CensusErrorCode, Result};
use super::sources::LpPool;
use super::types::{PoolId, Wad, WAD};

#[inline]
fn bu(v: Wad) -> BigUint {
    BigUint::from(v)
}

#[inline]
fn to_wad(v: &BigUint) -> Result<Wad> {
    v.to_u128()
        .ok_or_else(|| crate::census_err!(CensusErrorCode::OverflowNumeric, op => "narrow", value => v))
}

#[inline]
fn floor_rat_to_u128(r: &BigRational) -> Result<Wad> {
    let f: BigInt = r.floor().to_integer();
    f.to_u128()
        .ok_or_else(|| crate::census_err!(CensusErrorCode::OverflowNumeric, op => "narrow", value => f))
}

/// Erro máximo (inclusivo) do core para um saldo `q`.
pub fn truncation_bound(q: Wad) -> Wad {
    q / WAD + 1
}

/// Equivalente com a política do core, dado `out = quote(q)`.
pub fn policy_equivalent(q: Wad, out: Wad) -> Result<Wad> {
    if q == 0 {
        return Ok(0);
    }
    let rate = (bu(out) * bu(WAD)).div_floor(&bu(q));
    // a taxa precisa caber em u128 como no core
    to_wad(&rate)?;
    to_wad(&(bu(q) * rate).div_floor(&bu(WAD)))
}

/// Equivalente contínuo: `q · (out / q)`.
pub fn exact_equivalent(q: Wad, out: Wad) -> BigRational {
    if q == 0 {
        return BigRational::zero();
    }
    let q_q = BigRational::from_integer(BigInt::from(q));
    let rate = BigRational::new(BigInt::from(out), BigInt::from(q));
    q_q * rate
}

#[derive(Debug, Clone)]
pub struct RefEquivalent {
    pub lp_balance: Wad,
    pub core: Wad,
    pub policy: Wad,
    pub exact: BigRational,
    pub exact_floor: Wad,
    /// `exact_floor - core`
    pub error: Wad,
    pub bound: Wad,
}

impl RefEquivalent {
    pub fn within_bound(&self) -> bool {
        self.core == self.policy && self.error <= self.bound
    }
}

/// Compara o core ([`DustGuard::guarded_equivalent`]) com a referência.
/// Saldos zero ou dust têm referência 0: o piso é parte da política.
pub fn golden_equivalent<P>(guard: DustGuard, pool_id: PoolId, pool: &P, lp_balance: Wad) -> Result<RefEquivalent>
where
    P: LpPool + ?Sized,
{
    let core = guard.guarded_equivalent(pool_id, pool, lp_balance)?;
    let (policy, exact) = if lp_balance == 0 || guard.is_dust(lp_balance) {
        (0, BigRational::zero())
    } else {
        let out = pool
            .quote(lp_balance)
            .map_err(|err| from_source(ReadKind::Quote, pool_id.name(), &err))?;
        (policy_equivalent(lp_balance, out)?, exact_equivalent(lp_balance, out))
    };
    let exact_floor = floor_rat_to_u128(&exact)?;
    let error = exact_floor.checked_sub(core).ok_or_else(|| {
        crate::census_err!(CensusErrorCode::OverflowNumeric, op => "error", core => core, exact => exact_floor)
    })?;
    Ok(RefEquivalent {
        lp_balance,
        core,
        policy,
        exact,
        exact_floor,
        error,
        bound: truncation_bound(lp_balance),
    })
}
