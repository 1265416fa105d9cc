//! Colaboradores em memória para demos, benches e testes.
//!
//! `StaticPool` modela um pool linear (`out = q * rate / 1e18`) com dois desvios
//! que pools reais exibem: revert abaixo de um input mínimo e um resíduo fixo na
//! saída, que infla a taxa por unidade em quantidades minúsculas.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::consistency::{ReferencePriceSource, ReferenceQuotes};
use super::sources::{LpPool, PriceFeed, SourceError, TokenLedger};
use super::types::{Address, Asset, Wad, U256, WAD};

#[derive(Debug, Default)]
pub struct InMemoryToken {
    balances: HashMap<Address, Wad>,
    unreachable: bool,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, who: Address, amount: Wad) -> Self {
        self.balances.insert(who, amount);
        self
    }

    /// Toda leitura falha com `Unreachable`.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

impl TokenLedger for InMemoryToken {
    fn balance_of(&self, who: &Address) -> Result<Wad, SourceError> {
        if self.unreachable {
            return Err(SourceError::unreachable("token ledger offline"));
        }
        Ok(self.balances.get(who).copied().unwrap_or(0))
    }
}

#[derive(Debug, Default)]
pub struct StaticPool {
    rate: Wad,
    min_input: Wad,
    output_offset: Wad,
    failing: bool,
    balances: HashMap<Address, Wad>,
    quote_calls: AtomicU64,
}

impl StaticPool {
    /// Pool linear: `rate` SQUID por LP (WAD).
    pub fn new(rate: Wad) -> Self {
        Self { rate, ..Self::default() }
    }

    pub fn with_lp_balance(mut self, who: Address, amount: Wad) -> Self {
        self.balances.insert(who, amount);
        self
    }

    /// Reverte cotações com `lp_amount < min_input` (proteção própria do pool).
    pub fn with_min_input(mut self, min_input: Wad) -> Self {
        self.min_input = min_input;
        self
    }

    /// Soma um resíduo fixo à saída de toda cotação.
    pub fn with_output_offset(mut self, offset: Wad) -> Self {
        self.output_offset = offset;
        self
    }

    /// Toda cotação falha com `Unreachable`.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn quote_calls(&self) -> u64 {
        self.quote_calls.load(Ordering::Relaxed)
    }
}

impl LpPool for StaticPool {
    fn lp_balance_of(&self, who: &Address) -> Result<Wad, SourceError> {
        Ok(self.balances.get(who).copied().unwrap_or(0))
    }

    fn quote(&self, lp_amount: Wad) -> Result<Wad, SourceError> {
        self.quote_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing {
            return Err(SourceError::unreachable("pool offline"));
        }
        if lp_amount == 0 {
            return Err(SourceError::reverted("zero input"));
        }
        if lp_amount < self.min_input {
            return Err(SourceError::reverted("input below pool minimum"));
        }
        let wide = U256::from(lp_amount) * U256::from(self.rate) / U256::from(WAD);
        if wide > U256::from(u128::MAX) {
            return Err(SourceError::reverted("pool math overflow"));
        }
        wide.as_u128()
            .checked_add(self.output_offset)
            .ok_or_else(|| SourceError::reverted("pool math overflow"))
    }
}

#[derive(Debug, Default)]
pub struct FixedPriceFeed {
    prices: HashMap<Asset, Wad>,
}

impl FixedPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, asset: Asset, usd: Wad) -> Self {
        self.prices.insert(asset, usd);
        self
    }
}

impl PriceFeed for FixedPriceFeed {
    fn price(&self, asset: Asset) -> Result<Wad, SourceError> {
        self.prices
            .get(&asset)
            .copied()
            .ok_or_else(|| SourceError::no_liquidity(format!("no price for {asset}")))
    }
}

/// Fonte de preços de referência fixa; conta quantas vezes foi consultada.
#[derive(Debug, Default)]
pub struct StaticReferenceSource {
    quotes: ReferenceQuotes,
    failing: bool,
    fetches: AtomicU64,
}

impl StaticReferenceSource {
    pub fn new(quotes: ReferenceQuotes) -> Self {
        Self { quotes, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl ReferencePriceSource for StaticReferenceSource {
    fn fetch(&self) -> Result<ReferenceQuotes, SourceError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if self.failing {
            return Err(SourceError::unreachable("reference api offline"));
        }
        Ok(self.quotes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_pool_is_linear_without_offset() {
        let pool = StaticPool::new(3 * WAD);
        assert_eq!(pool.quote(WAD).unwrap(), 3 * WAD);
        assert_eq!(pool.quote(7).unwrap(), 21);
        assert_eq!(pool.quote_calls(), 2);
    }

    #[test]
    fn static_pool_reverts_below_min_and_on_zero() {
        let pool = StaticPool::new(WAD).with_min_input(10);
        assert!(pool.quote(9).is_err());
        assert!(pool.quote(0).is_err());
        assert_eq!(pool.quote(10).unwrap(), 10);
    }

    #[test]
    fn unknown_addresses_hold_nothing() {
        let token = InMemoryToken::new();
        assert_eq!(token.balance_of(&Address::from_low_u64_be(9)).unwrap(), 0);
        assert!(InMemoryToken::new().unreachable().balance_of(&Address::zero()).is_err());
    }

    #[test]
    fn missing_price_is_no_liquidity() {
        let err = FixedPriceFeed::new().price(Asset::Eth).unwrap_err();
        assert_eq!(err.kind, crate::census::sources::SourceErrorKind::NoLiquidity);
    }
}
