//! Helpers numéricos seguros para o census.
//! Objetivo: multiplicações/divisões sem estouro e somas checadas; nada de wrap silencioso.

use super::errors::{CensusErrorCode, Result};
use super::types::{Wad, U256};

#[inline]
pub fn checked_add(a: Wad, b: Wad) -> Result<Wad> {
    a.checked_add(b)
        .ok_or_else(|| crate::census_err!(CensusErrorCode::OverflowNumeric, op => "add", a => a, b => b))
}

#[inline]
pub fn mul_u128_to_u256(a: Wad, b: Wad) -> U256 {
    U256::from(a) * U256::from(b)
}

#[inline]
pub fn u256_to_u128_checked(v: U256) -> Result<Wad> {
    if v > U256::from(u128::MAX) {
        Err(crate::census_err!(CensusErrorCode::OverflowNumeric, op => "narrow", value => v))
    } else {
        Ok(v.as_u128())
    }
}

/// `floor(a * b / d)` com produto em 256 bits e downcast checado.
pub fn mul_div_floor(a: Wad, b: Wad, d: Wad) -> Result<Wad> {
    if d == 0 {
        crate::census_bail!(CensusErrorCode::OverflowNumeric, op => "div", a => a, b => b);
    }
    let q = mul_u128_to_u256(a, b) / U256::from(d);
    u256_to_u128_checked(q)
}

/// Soma checada de várias parcelas (cada uma já truncada individualmente).
pub fn checked_sum(parts: &[Wad]) -> Result<Wad> {
    parts.iter().try_fold(0u128, |acc, part| checked_add(acc, *part))
}
