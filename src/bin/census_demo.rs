use anyhow::Result;
use opentelemetry::KeyValue;
use std::time::Instant;
use tracing::{info, warn};

use squid_census::census::consistency::{check_all_prices, check_lp_rate_bounds, ReferencePriceCache, ReferenceQuotes};
use squid_census::census::memory::{FixedPriceFeed, InMemoryToken, StaticPool, StaticReferenceSource};
use squid_census::telemetry;
use squid_census::{Address, Asset, Census, CensusConfig, WAD};

const RATE_SQUID_ETH: u128 = 1_513 * WAD;
const RATE_SQUID_SQUILL: u128 = 12_600_000_000_000_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    // sem coletor configurado, só log no terminal
    let tel = if std::env::var(telemetry::ENV_OTLP_ENDPOINT).is_ok() {
        Some(telemetry::init("squid-census")?)
    } else {
        telemetry::init_fmt_only();
        None
    };

    let config = CensusConfig::from_env()?;
    info!(?config, "configuração carregada");

    let whale = Address::from_low_u64_be(0xa1);
    let lp_only = Address::from_low_u64_be(0xb2);
    let dust = Address::from_low_u64_be(0xc3);
    let voters = [whale, lp_only, dust, Address::zero()];

    let token = InMemoryToken::new()
        .with_balance(whale, 250_000 * WAD)
        .with_balance(dust, 1_000);
    let squid_eth = StaticPool::new(RATE_SQUID_ETH)
        .with_lp_balance(whale, 12 * WAD)
        .with_lp_balance(dust, 5_000_000);
    let squid_squill = StaticPool::new(RATE_SQUID_SQUILL)
        .with_output_offset(5_000_000)
        .with_lp_balance(lp_only, 40 * WAD)
        .with_lp_balance(dust, 1);
    let feed = FixedPriceFeed::new()
        .with_price(Asset::Eth, 3_120 * WAD)
        .with_price(Asset::Squid, WAD / 95)
        .with_price(Asset::Squill, 13 * WAD / 100);

    let census = Census::new(token, squid_eth, squid_squill, feed, config)?;

    for (i, voter) in voters.iter().enumerate() {
        let span = telemetry::make_info_span("voting_balance", i as u32, "census_demo");
        let _guard = span.enter();

        let t0 = Instant::now();
        let b = census.breakdown(voter)?;
        let total = b.total()?;
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
        if let Some(tel) = &tel {
            tel.voting_balance_latency_ms.record(elapsed_ms, &[KeyValue::new("op", "voting_balance")]);
        }
        info!(voter = ?voter, raw = b.raw, squid_lp_in_squid = b.squid_lp_in_squid, squill_lp_in_squid = b.squill_lp_in_squid, total, "poder de voto");
    }

    for check in check_lp_rate_bounds(&census)? {
        info!(pool = %check.pool, rate = check.rate, plausible = check.plausible, "taxa de referência");
    }

    let snapshot = census.snapshot(&voters)?;
    if let Some(tel) = &tel {
        tel.snapshot_voters.add(snapshot.len() as u64, &[]);
    }
    for (rank, w) in snapshot.iter().enumerate() {
        info!(rank = rank + 1, voter = ?w.voter, balance = w.balance, "snapshot");
    }

    let reference = ReferencePriceCache::new(StaticReferenceSource::new(ReferenceQuotes {
        eth: Some(3_100 * WAD),
        squid: Some(WAD / 100),
        squill: Some(WAD / 8),
    }));
    for check in check_all_prices(&census, &reference)? {
        if check.within_tolerance {
            info!(asset = %check.asset, variance_ppm = check.variance_ppm, "preço consistente");
        } else {
            warn!(asset = %check.asset, variance_ppm = check.variance_ppm, "preço divergente");
        }
    }

    if let Some(tel) = tel {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tel.shutdown();
    }
    Ok(())
}
