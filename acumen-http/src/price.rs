//! CoinGecko price-oracle client.
//!
//! Fetches USD spot prices for native coin families from the CoinGecko
//! simple-price API. Per the [`PriceOracle`] contract, [`native_usd`] is
//! infallible: any failure - network error, rate-limit status, malformed
//! body, missing field - returns the family's fallback constant instead of
//! propagating. Staleness beats an error screen.
//!
//! [`native_usd`]: PriceOracle::native_usd

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use acumen::chain::NativeFamily;
use acumen::portfolio::PriceOracle;

/// Public CoinGecko API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the CoinGecko coin id for a native family.
#[must_use]
pub const fn coin_id(family: NativeFamily) -> &'static str {
    match family {
        NativeFamily::Ether => "ethereum",
        NativeFamily::Pol => "polygon-ecosystem-token",
    }
}

/// Returns the conservative fallback USD price used when the feed fails.
#[must_use]
pub fn fallback_usd(family: NativeFamily) -> Decimal {
    match family {
        // Recent-historical floor prices; stale but never absent.
        NativeFamily::Ether => Decimal::new(3_000, 0),
        NativeFamily::Pol => Decimal::new(40, 2),
    }
}

/// Errors from a single price fetch, absorbed into the fallback constant.
#[derive(Debug, thiserror::Error)]
enum PriceFetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("no usd quote for {0:?} in response")]
    MissingQuote(&'static str),
}

#[derive(Debug, Deserialize)]
struct CoinQuote {
    usd: Option<Decimal>,
}

/// [`PriceOracle`] implementation over the CoinGecko simple-price API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CoinGeckoClient {
    /// Creates a client against the public CoinGecko API.
    ///
    /// # Panics
    ///
    /// Panics if the built-in base URL fails to parse; it cannot.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.parse().expect("valid built-in base URL"))
    }

    /// Creates a client against a custom API base URL.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { http, base_url }
    }

    /// Fetches USD prices for a set of CoinGecko coin ids in one request.
    ///
    /// Best-effort: coins missing from the response are absent from the map,
    /// and a failed request yields an empty map.
    pub async fn usd_prices(&self, ids: &[&str]) -> HashMap<String, Decimal> {
        match self.fetch_quotes(&ids.join(",")).await {
            Ok(quotes) => quotes
                .into_iter()
                .filter_map(|(id, quote)| quote.usd.map(|usd| (id, usd)))
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "price fetch failed; returning no quotes");
                HashMap::new()
            }
        }
    }

    async fn fetch_quotes(
        &self,
        ids: &str,
    ) -> Result<HashMap<String, CoinQuote>, PriceFetchError> {
        let url = format!("{}/simple/price", self.base_url.as_str().trim_end_matches('/'));
        let response = self
            .http
            .get(url)
            .query(&[("ids", ids), ("vs_currencies", "usd")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn spot_usd(&self, family: NativeFamily) -> Result<Decimal, PriceFetchError> {
        let id = coin_id(family);
        let mut quotes = self.fetch_quotes(id).await?;
        quotes
            .remove(id)
            .and_then(|quote| quote.usd)
            .ok_or(PriceFetchError::MissingQuote(id))
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceOracle for CoinGeckoClient {
    async fn native_usd(&self, family: NativeFamily) -> Decimal {
        match self.spot_usd(family).await {
            Ok(price) => price,
            Err(err) => {
                let fallback = fallback_usd(family);
                tracing::warn!(
                    ?family,
                    error = %err,
                    %fallback,
                    "price feed unavailable; using fallback constant"
                );
                fallback
            }
        }
    }
}
