//! Census: soma saldo SQUID bruto + equivalentes de LP protegidos contra dust.
//!
//! `voting_balance = raw + floor(lp_a * rate_a / 1e18) + floor(lp_b * rate_b / 1e18)`
//!
//! Cada parcela é truncada sozinha e a soma é checada. Os acessores de decomposição
//! usam as mesmas funções de componente do total, então a igualdade
//! `total == raw + lp_a_in_squid + lp_b_in_squid` é exata com estado externo inalterado.
//! As três leituras de um mesmo cálculo não são atômicas entre si: cada uma vê o
//! estado corrente da fonte no momento da chamada.

use std::cmp::Ordering;

use tracing::{debug, debug_span};

use super::config::CensusConfig;
use super::dust::DustGuard;
use super::error_map::{from_source, ReadKind};
use super::errors::Result;
use super::guardrails::checked_sum;
use super::price_view::read_price;
use super::sources::{LpPool, PriceFeed, TokenLedger};
use super::types::{Address, Asset, PoolId, Wad};
use crate::obs::wrap;

/// Componentes do poder de voto de um endereço.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VotingBreakdown {
    pub raw: Wad,
    pub squid_lp: Wad,
    pub squill_lp: Wad,
    pub squid_lp_in_squid: Wad,
    pub squill_lp_in_squid: Wad,
}

impl VotingBreakdown {
    pub fn total(&self) -> Result<Wad> {
        checked_sum(&[self.raw, self.squid_lp_in_squid, self.squill_lp_in_squid])
    }
}

/// Peso de um eleitor num snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoterWeight {
    pub voter: Address,
    pub balance: Wad,
}

pub struct Census<T, A, B, F> {
    token: T,
    squid_pool: A,
    squill_pool: B,
    prices: F,
    squid_guard: DustGuard,
    squill_guard: DustGuard,
    reference_quantity: Wad,
}

impl<T, A, B, F> Census<T, A, B, F>
where
    T: TokenLedger,
    A: LpPool,
    B: LpPool,
    F: PriceFeed,
{
    /// Falha com `InvalidConfig` se `config` não passar em [`CensusConfig::validate`].
    pub fn new(token: T, squid_pool: A, squill_pool: B, prices: F, config: CensusConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            token,
            squid_pool,
            squill_pool,
            prices,
            squid_guard: config.dust_guard(PoolId::SquidEth),
            squill_guard: config.dust_guard(PoolId::SquidSquill),
            reference_quantity: config.reference_quantity,
        })
    }

    pub fn dust_guard(&self, pool: PoolId) -> DustGuard {
        match pool {
            PoolId::SquidEth => self.squid_guard,
            PoolId::SquidSquill => self.squill_guard,
        }
    }

    fn pool(&self, pool: PoolId) -> &dyn LpPool {
        match pool {
            PoolId::SquidEth => &self.squid_pool,
            PoolId::SquidSquill => &self.squill_pool,
        }
    }

    // --------- Leituras brutas ---------

    pub fn squid_balance(&self, who: &Address) -> Result<Wad> {
        if who.is_zero() {
            return Ok(0);
        }
        self.token
            .balance_of(who)
            .map_err(|err| from_source(ReadKind::Balance, "squid", &err))
    }

    pub fn lp_balance(&self, pool: PoolId, who: &Address) -> Result<Wad> {
        if who.is_zero() {
            return Ok(0);
        }
        self.pool(pool)
            .lp_balance_of(who)
            .map_err(|err| from_source(ReadKind::Balance, pool.name(), &err))
    }

    pub fn squid_lp_balance(&self, who: &Address) -> Result<Wad> {
        self.lp_balance(PoolId::SquidEth, who)
    }

    pub fn squill_lp_balance(&self, who: &Address) -> Result<Wad> {
        self.lp_balance(PoolId::SquidSquill, who)
    }

    // --------- Taxas (SQUID por LP, WAD) ---------

    /// Taxa por LP consultando `quantity`; 0 para quantidade zero ou dust.
    pub fn lp_equivalent(&self, pool: PoolId, quantity: Wad) -> Result<Wad> {
        self.dust_guard(pool).guarded_rate(pool, self.pool(pool), quantity)
    }

    pub fn squid_lp_equivalent(&self, quantity: Wad) -> Result<Wad> {
        self.lp_equivalent(PoolId::SquidEth, quantity)
    }

    pub fn squill_lp_equivalent(&self, quantity: Wad) -> Result<Wad> {
        self.lp_equivalent(PoolId::SquidSquill, quantity)
    }

    /// Taxa na quantidade de referência configurada (1 LP por padrão).
    pub fn squid_lp_rate(&self) -> Result<Wad> {
        self.squid_lp_equivalent(self.reference_quantity)
    }

    pub fn squill_lp_rate(&self) -> Result<Wad> {
        self.squill_lp_equivalent(self.reference_quantity)
    }

    // --------- Componentes e total ---------

    fn lp_in_squid_of(&self, pool: PoolId, lp_balance: Wad) -> Result<Wad> {
        self.dust_guard(pool)
            .guarded_equivalent(pool, self.pool(pool), lp_balance)
    }

    pub fn lp_balance_in_squid(&self, pool: PoolId, who: &Address) -> Result<Wad> {
        let lp = self.lp_balance(pool, who)?;
        self.lp_in_squid_of(pool, lp)
    }

    pub fn squid_lp_balance_in_squid(&self, who: &Address) -> Result<Wad> {
        self.lp_balance_in_squid(PoolId::SquidEth, who)
    }

    pub fn squill_lp_balance_in_squid(&self, who: &Address) -> Result<Wad> {
        self.lp_balance_in_squid(PoolId::SquidSquill, who)
    }

    /// Todas as parcelas de `who`, cada leitura feita uma única vez.
    pub fn breakdown(&self, who: &Address) -> Result<VotingBreakdown> {
        if who.is_zero() {
            return Ok(VotingBreakdown::default());
        }
        let span = debug_span!("census.breakdown", voter = ?who);
        let _guard = span.enter();

        let raw = self.squid_balance(who)?;
        let squid_lp = self.squid_lp_balance(who)?;
        let squill_lp = self.squill_lp_balance(who)?;
        let squid_lp_in_squid = self.lp_in_squid_of(PoolId::SquidEth, squid_lp)?;
        let squill_lp_in_squid = self.lp_in_squid_of(PoolId::SquidSquill, squill_lp)?;

        let breakdown = VotingBreakdown { raw, squid_lp, squill_lp, squid_lp_in_squid, squill_lp_in_squid };
        debug!(?breakdown, "componentes do poder de voto");
        Ok(breakdown)
    }

    /// Poder de voto (`balanceOf` do census). Endereço zero ⇒ 0.
    pub fn voting_balance(&self, who: &Address) -> Result<Wad> {
        wrap::time("voting_balance", || self.breakdown(who)?.total())
    }

    /// Poder de voto de vários endereços, do maior para o menor (empate por endereço).
    /// Qualquer falha aborta o snapshot inteiro.
    pub fn snapshot(&self, voters: &[Address]) -> Result<Vec<VoterWeight>> {
        let mut weights = voters
            .iter()
            .map(|voter| Ok(VoterWeight { voter: *voter, balance: self.voting_balance(voter)? }))
            .collect::<Result<Vec<_>>>()?;
        weights.sort_by(|a, b| match b.balance.cmp(&a.balance) {
            Ordering::Equal => a.voter.cmp(&b.voter),
            other => other,
        });
        Ok(weights)
    }

    // --------- Preços (informativos) ---------

    pub fn price(&self, asset: Asset) -> Result<Wad> {
        read_price(&self.prices, asset)
    }

    pub fn eth_price(&self) -> Result<Wad> {
        self.price(Asset::Eth)
    }

    pub fn squid_price(&self) -> Result<Wad> {
        self.price(Asset::Squid)
    }

    pub fn squill_price(&self) -> Result<Wad> {
        self.price(Asset::Squill)
    }
}
