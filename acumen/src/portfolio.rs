//! Multi-chain balance aggregation.
//!
//! The [`Aggregator`] fans a [`BalanceSource`] out over a set of chains
//! concurrently and merges the results into one [`PortfolioSnapshot`]. The
//! fan-out is a join barrier: no snapshot is produced until every launched
//! fetch has settled, so callers never observe a half-updated view. A chain
//! whose fetch fails contributes an all-zero balance instead of poisoning the
//! whole aggregation.
//!
//! Native coins are priced through a [`PriceOracle`], once per distinct
//! [`NativeFamily`] rather than once per chain.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use futures_util::future::join_all;
use rust_decimal::Decimal;

use crate::balance::{ChainBalance, PortfolioSnapshot, TokenTotals};
use crate::chain::{ALL_TOKENS, Chain, NativeFamily, Token};

/// Fetches the balance snapshot for one `(address, chain)` pair.
///
/// Implementations own their transport; the aggregator only requires that a
/// failed fetch reports an error it can log before degrading that chain to
/// zero.
pub trait BalanceSource: Send + Sync {
    /// Error reported by a failed fetch.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the native and token balances of `address` on `chain`.
    fn chain_balance(
        &self,
        address: &str,
        chain: Chain,
    ) -> impl Future<Output = Result<ChainBalance, Self::Error>> + Send;
}

/// Supplies USD spot prices for native coin families.
///
/// Infallible by contract: an implementation that cannot reach its feed
/// returns a documented fallback constant. Portfolio valuation must never
/// become unavailable because a price feed hiccuped; staleness beats an
/// error screen.
pub trait PriceOracle: Send + Sync {
    /// Returns the USD price of one unit of the family's native coin.
    fn native_usd(&self, family: NativeFamily) -> impl Future<Output = Decimal> + Send;
}

/// Composes a balance source and a price oracle into portfolio snapshots.
#[derive(Debug, Clone)]
pub struct Aggregator<B, P> {
    balances: B,
    prices: P,
}

impl<B, P> Aggregator<B, P>
where
    B: BalanceSource,
    P: PriceOracle,
{
    /// Creates an aggregator over the given source and oracle.
    pub const fn new(balances: B, prices: P) -> Self {
        Self { balances, prices }
    }

    /// Aggregates balances for `address` across `chains`.
    ///
    /// Per-chain fetches run concurrently and are independent; the returned
    /// snapshot is complete (possibly all-zero) once every fetch and price
    /// lookup has settled. Duplicate chains in the input collapse to one
    /// entry.
    pub async fn aggregate(&self, address: &str, chains: &[Chain]) -> PortfolioSnapshot {
        let fetches = chains.iter().map(|&chain| {
            let balances = &self.balances;
            async move {
                match balances.chain_balance(address, chain).await {
                    Ok(balance) => (chain, balance),
                    Err(err) => {
                        tracing::warn!(%chain, error = %err, "chain balance fetch failed; reporting zero");
                        (chain, ChainBalance::zeroed(ALL_TOKENS))
                    }
                }
            }
        });

        let families: BTreeSet<NativeFamily> =
            chains.iter().filter_map(|c| c.native_family()).collect();
        let quotes = families.iter().map(|&family| {
            let prices = &self.prices;
            async move { (family, prices.native_usd(family).await) }
        });

        let (fetched, quoted) = futures_util::join!(join_all(fetches), join_all(quotes));
        let chains: BTreeMap<Chain, ChainBalance> = fetched.into_iter().collect();
        let prices: BTreeMap<NativeFamily, Decimal> = quoted.into_iter().collect();

        let mut cash = Decimal::ZERO;
        let mut native_usd = Decimal::ZERO;
        let mut totals = TokenTotals::default();
        for (chain, balance) in &chains {
            cash += balance.stablecoin_sum();
            totals.usdc += balance.token(Token::Usdc);
            totals.usdt += balance.token(Token::Usdt);
            totals.eth += balance.native;
            if let Some(family) = chain.native_family() {
                let price = prices.get(&family).copied().unwrap_or(Decimal::ZERO);
                native_usd += balance.native * price;
            }
        }

        PortfolioSnapshot { portfolio: cash + native_usd, cash, chains, tokens: totals }
    }
}
