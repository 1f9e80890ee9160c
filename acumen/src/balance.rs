//! Balance snapshot and portfolio types.
//!
//! All types here are value objects produced fresh by a fetch or aggregation
//! call and never mutated in place; a caller replaces its current snapshot
//! wholesale on refresh, so cross-chain sums are never observed half-updated.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::{Chain, Token};

/// One token position on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    /// The token.
    pub token: Token,
    /// Raw on-chain integer amount.
    pub raw: U256,
    /// Decimals reported by the token contract.
    ///
    /// Always queried from the contract, never assumed: testnet deployments
    /// of the same token routinely diverge from the canonical decimals.
    pub decimals: u8,
    /// Exact decimal value (`raw / 10^decimals`).
    pub amount: Decimal,
}

/// Per-chain balance snapshot.
///
/// Partial by design: a token whose contract query failed is simply carried
/// at zero, and the snapshot as a whole is still valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBalance {
    /// Native coin amount in whole coins.
    pub native: Decimal,
    /// Token amounts keyed by token.
    pub tokens: BTreeMap<Token, Decimal>,
}

impl ChainBalance {
    /// An all-zero snapshot carrying a zero entry for each given token.
    #[must_use]
    pub fn zeroed<I: IntoIterator<Item = Token>>(tokens: I) -> Self {
        Self {
            native: Decimal::ZERO,
            tokens: tokens.into_iter().map(|t| (t, Decimal::ZERO)).collect(),
        }
    }

    /// Returns the balance of one token, zero if absent.
    #[must_use]
    pub fn token(&self, token: Token) -> Decimal {
        self.tokens.get(&token).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of the stablecoin balances on this chain.
    #[must_use]
    pub fn stablecoin_sum(&self) -> Decimal {
        self.tokens
            .iter()
            .filter(|(token, _)| token.is_stablecoin())
            .map(|(_, amount)| *amount)
            .sum()
    }
}

/// Legacy flattened token totals, summed across all chains.
///
/// Kept for display compatibility with callers that predate the per-chain
/// map: every native coin amount collapses into the single `eth` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenTotals {
    /// USDC summed across all chains.
    pub usdc: Decimal,
    /// USDT summed across all chains.
    pub usdt: Decimal,
    /// Native coin amounts summed across all chains.
    pub eth: Decimal,
    /// Solana native amount; always zero under the EVM transport.
    pub sol: Decimal,
}

/// Aggregate portfolio view across all queried chains for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Total USD-valued holdings: cash plus priced native coins.
    pub portfolio: Decimal,
    /// Stablecoin-only sum, price-independent (stablecoins assumed at $1).
    pub cash: Decimal,
    /// Per-chain snapshots keyed by chain.
    pub chains: BTreeMap<Chain, ChainBalance>,
    /// Legacy flattened totals.
    pub tokens: TokenTotals,
}

impl PortfolioSnapshot {
    /// An empty snapshot with no chains.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            portfolio: Decimal::ZERO,
            cash: Decimal::ZERO,
            chains: BTreeMap::new(),
            tokens: TokenTotals::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn zeroed_carries_every_token() {
        let balance = ChainBalance::zeroed([Token::Usdc, Token::Usdt]);
        assert_eq!(balance.native, Decimal::ZERO);
        assert_eq!(balance.token(Token::Usdc), Decimal::ZERO);
        assert_eq!(balance.token(Token::Usdt), Decimal::ZERO);
    }

    #[test]
    fn missing_token_reads_as_zero() {
        let balance = ChainBalance { native: Decimal::ONE, tokens: BTreeMap::new() };
        assert_eq!(balance.token(Token::Usdt), Decimal::ZERO);
    }

    #[test]
    fn stablecoin_sum_covers_both_tokens() {
        let balance = ChainBalance {
            native: Decimal::from(3),
            tokens: BTreeMap::from([
                (Token::Usdc, Decimal::from_str("1.5").unwrap()),
                (Token::Usdt, Decimal::from_str("2.25").unwrap()),
            ]),
        };
        assert_eq!(balance.stablecoin_sum(), Decimal::from_str("3.75").unwrap());
    }

    #[test]
    fn snapshot_serializes_camel_case_with_caip2_keys() {
        let snapshot = PortfolioSnapshot {
            portfolio: Decimal::from(10),
            cash: Decimal::from(4),
            chains: BTreeMap::from([(
                Chain::BaseSepolia,
                ChainBalance::zeroed([Token::Usdc]),
            )]),
            tokens: TokenTotals::default(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("chains").unwrap().get("eip155:84532").is_some());
        assert!(json.get("portfolio").is_some());
        assert!(json.get("cash").is_some());
    }
}
