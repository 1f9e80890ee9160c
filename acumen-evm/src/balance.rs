//! Per-chain balance fetching over EVM JSON-RPC.
//!
//! One [`EvmBalanceSource::chain_balance`] call opens an HTTP provider for
//! the chain, queries the native balance and each configured token contract,
//! and returns a [`ChainBalance`]. The provider is scoped to the call -
//! acquired, used, and dropped on every exit path - so no connection outlives
//! a fetch.
//!
//! Failure containment: once the address has been validated, a single
//! token's query failing (missing contract, malformed address, node error)
//! degrades that token to zero; only a failure that makes the whole fetch
//! meaningless (native balance query, unreachable endpoint) surfaces as an
//! error, and the aggregator in turn degrades that chain to zero.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_transport::TransportError;
use alloy_transport_http::reqwest::Url;
use rust_decimal::Decimal;

use acumen::balance::{ChainBalance, TokenBalance};
use acumen::chain::{Chain, ChainFamily, Token};
use acumen::portfolio::BalanceSource;
use acumen::registry::ChainRegistry;
use acumen::units::{self, UnitsError};

use crate::contract::IERC20;

/// Decimals of the native coin on every supported EVM chain.
const NATIVE_DECIMALS: u8 = 18;

/// Errors that fail an entire chain-balance fetch.
#[derive(Debug, thiserror::Error)]
pub enum BalanceFetchError {
    /// The queried address is not a well-formed EVM address.
    #[error("invalid EVM address {0:?}")]
    InvalidAddress(String),

    /// The chain's configured RPC endpoint is not a valid URL.
    #[error("invalid RPC endpoint {0:?}")]
    InvalidRpcUrl(String),

    /// The native balance query failed.
    #[error(transparent)]
    Rpc(#[from] TransportError),
}

/// Errors for a single token query, absorbed to a zero balance.
#[derive(Debug, thiserror::Error)]
enum TokenQueryError {
    #[error("token contract address {0:?} is not an EVM address")]
    BadContractAddress(String),

    #[error(transparent)]
    Contract(#[from] alloy_contract::Error),

    #[error(transparent)]
    Units(#[from] UnitsError),
}

/// [`BalanceSource`] implementation over EVM JSON-RPC.
#[derive(Debug, Clone)]
pub struct EvmBalanceSource {
    registry: Arc<ChainRegistry>,
}

impl EvmBalanceSource {
    /// Creates a balance source reading endpoints and token contracts from
    /// the given registry.
    #[must_use]
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self { registry }
    }
}

impl BalanceSource for EvmBalanceSource {
    type Error = BalanceFetchError;

    async fn chain_balance(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<ChainBalance, BalanceFetchError> {
        let descriptor = self.registry.descriptor(chain);

        // The Solana family is served by a different protocol client; this
        // transport reports it as zero rather than erroring.
        if chain.family() == ChainFamily::Solana {
            return Ok(ChainBalance::zeroed(descriptor.tokens.keys().copied()));
        }

        let account: Address = address
            .parse()
            .map_err(|_| BalanceFetchError::InvalidAddress(address.to_owned()))?;
        let url: Url = descriptor
            .http_rpc_url
            .parse()
            .map_err(|_| BalanceFetchError::InvalidRpcUrl(descriptor.http_rpc_url.clone()))?;
        let provider = ProviderBuilder::new().connect_http(url);

        let wei = provider.get_balance(account).await?;
        let native = match units::format_units(wei, NATIVE_DECIMALS) {
            Ok(amount) => amount,
            Err(err) => {
                tracing::warn!(%chain, error = %err, "native balance out of range; reporting zero");
                Decimal::ZERO
            }
        };

        let mut tokens = std::collections::BTreeMap::new();
        for (&token, contract_address) in &descriptor.tokens {
            let amount = match token_balance(&provider, token, contract_address, account).await {
                Ok(balance) => balance.amount,
                Err(err) => {
                    tracing::warn!(
                        %chain,
                        %token,
                        error = %err,
                        "token balance query failed; reporting zero"
                    );
                    Decimal::ZERO
                }
            };
            tokens.insert(token, amount);
        }

        Ok(ChainBalance { native, tokens })
    }
}

/// Queries one token contract for the account's balance.
///
/// Decimals come from the contract, never from configuration: testnet
/// deployments of the same token routinely diverge.
async fn token_balance<P: Provider>(
    provider: &P,
    token: Token,
    contract_address: &str,
    account: Address,
) -> Result<TokenBalance, TokenQueryError> {
    let contract: Address = contract_address
        .parse()
        .map_err(|_| TokenQueryError::BadContractAddress(contract_address.to_owned()))?;
    let erc20 = IERC20::new(contract, provider);
    let raw: U256 = erc20.balanceOf(account).call().await?;
    let decimals: u8 = erc20.decimals().call().await?;
    let amount = units::format_units(raw, decimals)?;
    Ok(TokenBalance { token, raw, decimals, amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use acumen::chain::ALL_TOKENS;

    fn source() -> EvmBalanceSource {
        EvmBalanceSource::new(Arc::new(ChainRegistry::with_defaults()))
    }

    #[tokio::test]
    async fn solana_family_reports_zero_without_touching_the_network() {
        let balance = source().chain_balance("whatever", Chain::SolanaDevnet).await.unwrap();
        assert_eq!(balance.native, Decimal::ZERO);
        for token in ALL_TOKENS {
            assert_eq!(balance.token(token), Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn malformed_address_is_rejected_before_any_rpc() {
        let err = source().chain_balance("not-an-address", Chain::BaseSepolia).await.unwrap_err();
        assert!(matches!(err, BalanceFetchError::InvalidAddress(_)));

        let err = source()
            .chain_balance("0x123", Chain::BaseSepolia)
            .await
            .unwrap_err();
        assert!(matches!(err, BalanceFetchError::InvalidAddress(_)));
    }
}
