//! Checagens de consistência do census contra preços de referência externos.
//!
//! O cache de referência é um objeto explícito: quem o constrói decide o escopo
//! (uma sessão de testes, um ciclo do indexador) e o passa adiante. O engine em si
//! nunca lê este cache; ele só serve para comparar o que o census reporta.

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use super::aggregator::Census;
use super::error_map::{from_source, ReadKind};
use super::errors::{CensusErrorCode, Result};
use super::sources::{LpPool, PriceFeed, SourceError, TokenLedger};
use super::types::{Asset, PoolId, Ppm, Wad, PPM_SCALE, U256};

/// Tolerância padrão ETH on-chain vs referência (5%).
pub const DEFAULT_ETH_TOLERANCE_PPM: Ppm = 50_000;
/// Tolerância padrão SQUID/SQUILL on-chain vs referência (10%).
pub const DEFAULT_TOKEN_TOLERANCE_PPM: Ppm = 100_000;
/// Variação máxima da taxa por LP entre quantidades não-dust (1%).
pub const DEFAULT_RATE_TOLERANCE_PPM: Ppm = 10_000;
/// Faixa plausível (exclusiva) da taxa SQUID por LP em WAD.
pub const MIN_PLAUSIBLE_LP_RATE: Wad = 1_000_000_000_000_000; // 1e15
pub const MAX_PLAUSIBLE_LP_RATE: Wad = 1_000_000_000_000_000_000_000_000_000_000; // 1e30

/// Preços de referência em USD (WAD); `None` quando a fonte não cotou o ativo.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceQuotes {
    pub eth: Option<Wad>,
    pub squid: Option<Wad>,
    pub squill: Option<Wad>,
}

impl ReferenceQuotes {
    pub fn get(&self, asset: Asset) -> Option<Wad> {
        match asset {
            Asset::Eth => self.eth,
            Asset::Squid => self.squid,
            Asset::Squill => self.squill,
        }
    }
}

/// API externa de preços (ex.: agregador de mercado).
pub trait ReferencePriceSource: Send + Sync {
    fn fetch(&self) -> std::result::Result<ReferenceQuotes, SourceError>;
}

/// Busca os preços de referência no máximo uma vez por instância.
/// Uma falha não é memorizada: a próxima chamada tenta de novo.
pub struct ReferencePriceCache<S> {
    source: S,
    quotes: OnceCell<ReferenceQuotes>,
}

impl<S: ReferencePriceSource> ReferencePriceCache<S> {
    pub fn new(source: S) -> Self {
        Self { source, quotes: OnceCell::new() }
    }

    pub fn quotes(&self) -> Result<&ReferenceQuotes> {
        self.quotes.get_or_try_init(|| {
            let quotes = self
                .source
                .fetch()
                .map_err(|err| from_source(ReadKind::Reference, "reference_prices", &err))?;
            info!(eth = ?quotes.eth, squid = ?quotes.squid, squill = ?quotes.squill, "preços de referência carregados");
            Ok(quotes)
        })
    }

    pub fn price(&self, asset: Asset) -> Result<Wad> {
        self.quotes()?.get(asset).ok_or_else(|| {
            crate::census_err!(CensusErrorCode::SourceUnavailable, source => "reference_prices", asset => asset)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.quotes.get().is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

/// `|other - base| / base` em PPM (floor), saturado em `u32::MAX`.
/// Base zero não tem variância definida: `InvalidInput`.
pub fn variance_ppm(base: Wad, other: Wad) -> Result<Ppm> {
    if base == 0 {
        crate::census_bail!(CensusErrorCode::InvalidInput, op => "variance", base => base, other => other);
    }
    let ppm = U256::from(base.abs_diff(other)) * U256::from(PPM_SCALE) / U256::from(base);
    if ppm > U256::from(Ppm::MAX) {
        return Ok(Ppm::MAX);
    }
    Ok(ppm.as_u32())
}

pub fn default_tolerance_ppm(asset: Asset) -> Ppm {
    match asset {
        Asset::Eth => DEFAULT_ETH_TOLERANCE_PPM,
        Asset::Squid | Asset::Squill => DEFAULT_TOKEN_TOLERANCE_PPM,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PriceCheck {
    pub asset: Asset,
    pub on_chain: Wad,
    pub reference: Wad,
    pub variance_ppm: Ppm,
    pub tolerance_ppm: Ppm,
    pub within_tolerance: bool,
}

/// Compara o preço do census com a referência (variância relativa à referência).
pub fn check_price<T, A, B, F, S>(
    census: &Census<T, A, B, F>,
    cache: &ReferencePriceCache<S>,
    asset: Asset,
    tolerance_ppm: Ppm,
) -> Result<PriceCheck>
where
    T: TokenLedger,
    A: LpPool,
    B: LpPool,
    F: PriceFeed,
    S: ReferencePriceSource,
{
    let reference = cache.price(asset)?;
    let on_chain = census.price(asset)?;
    let variance_ppm = variance_ppm(reference, on_chain)?;
    let within_tolerance = variance_ppm < tolerance_ppm;
    if !within_tolerance {
        warn!(asset = %asset, on_chain, reference, variance_ppm, tolerance_ppm, "preço fora da tolerância");
    }
    Ok(PriceCheck { asset, on_chain, reference, variance_ppm, tolerance_ppm, within_tolerance })
}

/// Checa os três ativos com as tolerâncias padrão.
pub fn check_all_prices<T, A, B, F, S>(
    census: &Census<T, A, B, F>,
    cache: &ReferencePriceCache<S>,
) -> Result<Vec<PriceCheck>>
where
    T: TokenLedger,
    A: LpPool,
    B: LpPool,
    F: PriceFeed,
    S: ReferencePriceSource,
{
    Asset::all()
        .iter()
        .map(|asset| check_price(census, cache, *asset, default_tolerance_ppm(*asset)))
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RateCheck {
    pub quantity: Wad,
    pub rate: Wad,
    pub variance_ppm: Ppm,
    pub within_tolerance: bool,
}

/// Compara a taxa por LP em cada `quantities` com a taxa em `base_quantity`.
pub fn check_rate_invariance<T, A, B, F>(
    census: &Census<T, A, B, F>,
    pool: PoolId,
    base_quantity: Wad,
    quantities: &[Wad],
    tolerance_ppm: Ppm,
) -> Result<Vec<RateCheck>>
where
    T: TokenLedger,
    A: LpPool,
    B: LpPool,
    F: PriceFeed,
{
    let base = census.lp_equivalent(pool, base_quantity)?;
    quantities
        .iter()
        .map(|&quantity| {
            let rate = census.lp_equivalent(pool, quantity)?;
            let variance_ppm = variance_ppm(base, rate)?;
            Ok(RateCheck { quantity, rate, variance_ppm, within_tolerance: variance_ppm < tolerance_ppm })
        })
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RateBoundsCheck {
    pub pool: PoolId,
    pub rate: Wad,
    pub plausible: bool,
}

/// Taxa de referência de cada pool dentro de `(1e15, 1e30)`.
pub fn check_lp_rate_bounds<T, A, B, F>(census: &Census<T, A, B, F>) -> Result<Vec<RateBoundsCheck>>
where
    T: TokenLedger,
    A: LpPool,
    B: LpPool,
    F: PriceFeed,
{
    [(PoolId::SquidEth, census.squid_lp_rate()?), (PoolId::SquidSquill, census.squill_lp_rate()?)]
        .into_iter()
        .map(|(pool, rate)| {
            let plausible = rate > MIN_PLAUSIBLE_LP_RATE && rate < MAX_PLAUSIBLE_LP_RATE;
            if !plausible {
                warn!(pool = %pool, rate, "taxa por LP fora da faixa plausível");
            }
            Ok(RateBoundsCheck { pool, rate, plausible })
        })
        .collect()
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::config::CensusConfig;
    use crate::census::memory::{FixedPriceFeed, InMemoryToken, StaticPool, StaticReferenceSource};
    use crate::census::types::WAD;

    fn quotes() -> ReferenceQuotes {
        ReferenceQuotes { eth: Some(3_000 * WAD), squid: Some(WAD / 100), squill: None }
    }

    fn census() -> Census<InMemoryToken, StaticPool, StaticPool, FixedPriceFeed> {
        let feed = FixedPriceFeed::new()
            .with_price(Asset::Eth, 3_090 * WAD)
            .with_price(Asset::Squid, WAD / 80)
            .with_price(Asset::Squill, WAD);
        Census::new(
            InMemoryToken::new(),
            StaticPool::new(1_513 * WAD),
            StaticPool::new(12_600_000_000_000_000_000).with_output_offset(5_000_000),
            feed,
            CensusConfig::default(),
        )
            .unwrap()
    }

    #[test]
    fn t_variance_ppm() {
        assert_eq!(variance_ppm(100, 100).unwrap(), 0);
        assert_eq!(variance_ppm(100, 105).unwrap(), 50_000);
        assert_eq!(variance_ppm(100, 95).unwrap(), 50_000);
        assert_eq!(variance_ppm(1, u128::MAX).unwrap(), Ppm::MAX);
        let err = variance_ppm(0, 1).unwrap_err();
        assert_eq!(err.code, CensusErrorCode::InvalidInput);
        assert_eq!(err.context.get("op").map(String::as_str), Some("variance"));
    }

    #[test]
    fn t_cache_fetches_once() {
        let cache = ReferencePriceCache::new(StaticReferenceSource::new(quotes()));
        assert!(!cache.is_loaded());
        assert_eq!(cache.price(Asset::Eth).unwrap(), 3_000 * WAD);
        assert_eq!(cache.price(Asset::Squid).unwrap(), WAD / 100);
        assert!(cache.is_loaded());
        assert_eq!(cache.source().fetches(), 1);
    }

    #[test]
    fn t_cache_failure_is_not_memoized() {
        let cache = ReferencePriceCache::new(StaticReferenceSource::failing());
        assert_eq!(cache.quotes().unwrap_err().code, CensusErrorCode::SourceUnavailable);
        assert!(cache.quotes().is_err());
        assert_eq!(cache.source().fetches(), 2);
    }

    #[test]
    fn t_missing_reference_asset() {
        let cache = ReferencePriceCache::new(StaticReferenceSource::new(quotes()));
        let err = cache.price(Asset::Squill).unwrap_err();
        assert_eq!(err.code, CensusErrorCode::SourceUnavailable);
        assert_eq!(err.context.get("asset").map(String::as_str), Some("SQUILL"));
    }

    #[test]
    fn t_price_checks() {
        let c = census();
        let cache = ReferencePriceCache::new(StaticReferenceSource::new(quotes()));
        let eth = check_price(&c, &cache, Asset::Eth, DEFAULT_ETH_TOLERANCE_PPM).unwrap();
        assert_eq!(eth.variance_ppm, 30_000);
        assert!(eth.within_tolerance);
        // 0.0125 vs 0.01 ⇒ 25%
        let squid = check_price(&c, &cache, Asset::Squid, DEFAULT_TOKEN_TOLERANCE_PPM).unwrap();
        assert_eq!(squid.variance_ppm, 250_000);
        assert!(!squid.within_tolerance);
        assert!(check_all_prices(&c, &cache).is_err());
    }

    #[test]
    fn t_rate_invariance_linear_pool() {
        let c = census();
        let checks = check_rate_invariance(
            &c,
            PoolId::SquidEth,
            WAD,
            &[2 * WAD, 5 * WAD, 10 * WAD, 100 * WAD],
            DEFAULT_RATE_TOLERANCE_PPM,
        )
        .unwrap();
        assert!(checks.iter().all(|c| c.within_tolerance && c.variance_ppm == 0));
    }

    #[test]
    fn t_rate_invariance_dust_is_zeroed_not_inflated() {
        let c = census();
        // abaixo do piso a taxa publicada é 0, nunca a taxa inflada do pool
        let checks = check_rate_invariance(&c, PoolId::SquidSquill, WAD, &[1, 10_000_000], 10_000).unwrap();
        assert_eq!(checks[0].rate, 0);
        assert!(checks[0].rate <= c.squill_lp_rate().unwrap());
        // 10_000_000 wei + resíduo de 5e6 ⇒ taxa bem acima da de 1 LP
        assert!(!checks[1].within_tolerance);
    }

    #[test]
    fn t_rate_invariance_dust_base_is_invalid_input() {
        let err = check_rate_invariance(&census(), PoolId::SquidEth, 1_000, &[WAD], DEFAULT_RATE_TOLERANCE_PPM)
            .unwrap_err();
        assert_eq!(err.code, CensusErrorCode::InvalidInput);
    }

    #[test]
    fn t_lp_rate_bounds() {
        let checks = check_lp_rate_bounds(&census()).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].rate, 1_513 * WAD);
        assert!(checks.iter().all(|c| c.plausible));

        // 1 wei de SQUID por LP: positivo mas implausível
        let tiny = Census::new(
            InMemoryToken::new(),
            StaticPool::new(1),
            StaticPool::new(WAD),
            FixedPriceFeed::new(),
            CensusConfig::default(),
        )
        .unwrap();
        let checks = check_lp_rate_bounds(&tiny).unwrap();
        assert_eq!((checks[0].pool, checks[0].rate, checks[0].plausible), (PoolId::SquidEth, 1, false));
        assert!(checks[1].plausible);
    }
}
