//! Withdrawal transaction building.
//!
//! Turns a validated withdrawal request into an ABI-encoded ERC-20
//! `transfer` call. The builder never holds keys and never broadcasts: the
//! finished [`TransferCall`] is handed to an external [`SigningBackend`]
//! that performs device-resident signing and submission.
//!
//! Unlike balance fetching, every failure here is terminal for the call - a
//! malformed destination, an unsupported token, or a failed `decimals()`
//! query makes the withdrawal meaningless and is surfaced to the caller.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::ProviderBuilder;
use alloy_sol_types::SolCall;
use alloy_transport_http::reqwest::Url;
use serde::{Deserialize, Serialize};

use acumen::chain::{Chain, Token};
use acumen::registry::ChainRegistry;
use acumen::units::{self, UnitsError};

use crate::contract::IERC20;

/// A withdrawal request as received from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    /// Destination wallet address.
    pub destination: String,
    /// Amount to withdraw, as a decimal string (`"10.50"`).
    pub amount: String,
    /// Chain to withdraw on.
    pub chain: Chain,
    /// Token to withdraw.
    pub token: Token,
}

/// A fully-built token transfer call, ready for an external signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    /// Call target: the token contract.
    pub to: Address,
    /// ABI-encoded `transfer(destination, amount)` calldata.
    pub data: Bytes,
    /// Native value attached to the call; always zero for token transfers.
    pub value: U256,
}

/// Errors from building or submitting a withdrawal. All terminal; the
/// builder does not retry.
#[derive(Debug, thiserror::Error)]
pub enum WithdrawError {
    /// The destination is not a well-formed EVM address.
    #[error("invalid destination address {0:?}")]
    InvalidAddress(String),

    /// The token has no usable contract on the requested chain.
    #[error("token {token} not supported on chain {chain}")]
    UnsupportedToken {
        /// The requested token.
        token: Token,
        /// The requested chain.
        chain: Chain,
    },

    /// The chain's configured RPC endpoint is not a valid URL.
    #[error("invalid RPC endpoint {0:?}")]
    InvalidRpcUrl(String),

    /// The `decimals()` query against the token contract failed.
    #[error("decimals query failed: {0}")]
    DecimalsQueryFailed(#[source] alloy_contract::Error),

    /// The amount string could not be converted to base units.
    #[error(transparent)]
    InvalidAmount(#[from] UnitsError),

    /// The signing backend rejected or failed the submission.
    #[error("signing backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// External signing/broadcast boundary.
///
/// Implementations custody the keys, sign the prepared call from `sender`,
/// submit it, and return the transaction hash. This crate never sees key
/// material.
pub trait SigningBackend: Send + Sync {
    /// Error reported by a failed signing or submission.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs and broadcasts the call from `sender`, returning the tx hash.
    fn submit(
        &self,
        sender: Address,
        call: &TransferCall,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send;
}

/// Builds withdrawal transfer calls against the chain registry.
#[derive(Debug, Clone)]
pub struct WithdrawalBuilder {
    registry: Arc<ChainRegistry>,
}

impl WithdrawalBuilder {
    /// Creates a builder resolving token contracts from the given registry.
    #[must_use]
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the transfer call for a withdrawal request.
    ///
    /// Queries the token contract's `decimals()` and converts the amount
    /// with exact integer arithmetic - `"10.50"` at 6 decimals is exactly
    /// `10500000` base units regardless of magnitude.
    ///
    /// # Errors
    ///
    /// [`WithdrawError::InvalidAddress`], [`WithdrawError::UnsupportedToken`],
    /// [`WithdrawError::DecimalsQueryFailed`], or
    /// [`WithdrawError::InvalidAmount`]; see each variant.
    pub async fn build(&self, request: &WithdrawalRequest) -> Result<TransferCall, WithdrawError> {
        let destination: Address = request
            .destination
            .parse()
            .map_err(|_| WithdrawError::InvalidAddress(request.destination.clone()))?;
        let contract = self.resolve_contract(request.chain, request.token)?;

        let rpc_url = self.registry.http_rpc_url(request.chain);
        let url: Url = rpc_url
            .parse()
            .map_err(|_| WithdrawError::InvalidRpcUrl(rpc_url.to_owned()))?;
        let provider = ProviderBuilder::new().connect_http(url);
        let decimals: u8 = IERC20::new(contract, &provider)
            .decimals()
            .call()
            .await
            .map_err(WithdrawError::DecimalsQueryFailed)?;

        let base_units = units::parse_units(&request.amount, decimals)?;
        Ok(TransferCall {
            to: contract,
            data: encode_transfer(destination, base_units),
            value: U256::ZERO,
        })
    }

    /// Builds the call and hands it to the signing backend.
    ///
    /// # Errors
    ///
    /// Any [`build`](Self::build) error, or [`WithdrawError::Backend`] if the
    /// backend fails.
    pub async fn send_via<S: SigningBackend>(
        &self,
        backend: &S,
        sender: Address,
        request: &WithdrawalRequest,
    ) -> Result<TxHash, WithdrawError> {
        let call = self.build(request).await?;
        backend
            .submit(sender, &call)
            .await
            .map_err(|err| WithdrawError::Backend(Box::new(err)))
    }

    /// Resolves and normalizes the token's contract address on a chain.
    ///
    /// A configured address that is not a well-formed EVM address (e.g. an
    /// SPL mint on the Solana chain) is unsupported for withdrawal purposes.
    fn resolve_contract(&self, chain: Chain, token: Token) -> Result<Address, WithdrawError> {
        let unsupported = || WithdrawError::UnsupportedToken { token, chain };
        let configured = self.registry.token_address(chain, token).ok_or_else(unsupported)?;
        configured.parse().map_err(|_| unsupported())
    }
}

/// ABI-encodes an ERC-20 `transfer(destination, amount)` call.
#[must_use]
pub fn encode_transfer(destination: Address, base_units: U256) -> Bytes {
    IERC20::transferCall { to: destination, value: base_units }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use acumen::registry::ChainOverride;

    fn builder() -> WithdrawalBuilder {
        WithdrawalBuilder::new(Arc::new(ChainRegistry::with_defaults()))
    }

    #[tokio::test]
    async fn malformed_destination_is_rejected_first() {
        let request = WithdrawalRequest {
            destination: "0xnot-hex".into(),
            amount: "1".into(),
            chain: Chain::BaseSepolia,
            token: Token::Usdc,
        };
        let err = builder().build(&request).await.unwrap_err();
        assert!(matches!(err, WithdrawError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn missing_token_deployment_is_unsupported() {
        // A registry whose Base Sepolia table has USDC but no USDT.
        let registry = ChainRegistry::with_defaults().with_override(
            Chain::BaseSepolia,
            ChainOverride {
                tokens: Some(BTreeMap::from([(
                    Token::Usdc,
                    "0x036CbD53842c5426634e7929541eC2318f3dCF7e".to_owned(),
                )])),
                ..ChainOverride::default()
            },
        );
        let builder = WithdrawalBuilder::new(Arc::new(registry));
        let request = WithdrawalRequest {
            destination: "0x000000000000000000000000000000000000dEaD".into(),
            amount: "1".into(),
            chain: Chain::BaseSepolia,
            token: Token::Usdt,
        };
        let err = builder.build(&request).await.unwrap_err();
        assert!(matches!(
            err,
            WithdrawError::UnsupportedToken { token: Token::Usdt, chain: Chain::BaseSepolia }
        ));
    }

    #[tokio::test]
    async fn spl_mints_are_unsupported_for_withdrawal() {
        let request = WithdrawalRequest {
            destination: "0x000000000000000000000000000000000000dEaD".into(),
            amount: "1".into(),
            chain: Chain::SolanaDevnet,
            token: Token::Usdc,
        };
        let err = builder().build(&request).await.unwrap_err();
        assert!(matches!(err, WithdrawError::UnsupportedToken { .. }));
    }

    #[test]
    fn transfer_encoding_is_exact() {
        let destination: Address =
            "0x000000000000000000000000000000000000dEaD".parse().unwrap();
        // "10.50" at 6 decimals.
        let base_units = units::parse_units("10.50", 6).unwrap();
        assert_eq!(base_units, U256::from(10_500_000_u64));

        let data = encode_transfer(destination, base_units);
        // 4-byte selector + two 32-byte words.
        assert_eq!(data.len(), 68);
        // transfer(address,uint256) selector.
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        // Destination, left-padded to 32 bytes.
        assert_eq!(&data[16..36], destination.as_slice());
        // Amount, big-endian in the final word.
        assert_eq!(&data[36..], &base_units.to_be_bytes::<32>());
    }
}
