//! Leitura direta dos preços em USD (WAD). Informativo: não entra no poder de voto,
//! não passa pelo piso de dust e nunca é cacheado.

use tracing::{debug, warn};

use super::error_map::{from_source, ReadKind};
use super::errors::Result;
use super::sources::PriceFeed;
use super::types::{Asset, Wad};
use crate::obs::wrap;

pub fn read_price<F>(feed: &F, asset: Asset) -> Result<Wad>
where
    F: PriceFeed + ?Sized,
{
    let price = feed.price(asset).map_err(|err| {
        warn!(asset = %asset, error = %err, "price feed rejeitou a leitura");
        wrap::count_oracle_failure(asset.symbol());
        from_source(ReadKind::Quote, asset.symbol(), &err)
    })?;
    debug!(asset = %asset, price, "preço lido");
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::errors::CensusErrorCode;
    use crate::census::memory::FixedPriceFeed;
    use crate::census::types::WAD;

    #[test]
    fn passes_price_through() {
        let feed = FixedPriceFeed::new().with_price(Asset::Eth, 3_500 * WAD);
        assert_eq!(read_price(&feed, Asset::Eth).unwrap(), 3_500 * WAD);
    }

    #[test]
    fn missing_price_is_oracle_unavailable() {
        let err = read_price(&FixedPriceFeed::new(), Asset::Squill).unwrap_err();
        assert_eq!(err.code, CensusErrorCode::OracleUnavailable);
        assert_eq!(err.context.get("source").map(String::as_str), Some("SQUILL"));
    }
}
