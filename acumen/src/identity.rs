//! Identity-provider boundary and deposit-address resolution.
//!
//! The identity provider custodies embedded wallets on the user's behalf and
//! is treated as opaque: this module only reads its linked-account records.
//! Resolution never fails from the caller's perspective - any lookup problem
//! (unknown identity, provider unreachable) degrades to the deterministic
//! pseudo-address fallback, which is stable per identifier and therefore
//! needs no persistence.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::chain::{Chain, ChainFamily, Token};
use crate::pseudo;

/// A wallet or account record linked to an identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedAccount {
    /// Record kind (`"wallet"`, `"email"`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// How the wallet is connected (`"embedded"` for custodial wallets).
    pub connector_type: Option<String>,
    /// CAIP-2 chain the wallet lives on (`"eip155:1"`, `"solana:101"`).
    pub chain_id: Option<String>,
    /// Wallet client hint (`"metamask"`, `"phantom"`, ...).
    pub wallet_client_type: Option<String>,
    /// The wallet address.
    pub address: Option<String>,
}

impl LinkedAccount {
    fn is_embedded_wallet(&self) -> bool {
        self.kind == "wallet" && self.connector_type.as_deref() == Some("embedded")
    }

    /// Whether this record is an embedded wallet of the EVM family.
    #[must_use]
    pub fn is_embedded_evm_wallet(&self) -> bool {
        self.is_embedded_wallet()
            && (self.chain_id.as_deref().is_some_and(|c| c.starts_with("eip155"))
                || self.wallet_client_type.as_deref() == Some("metamask")
                || self.wallet_client_type.is_none())
    }

    /// Whether this record is an embedded wallet of the Solana family.
    #[must_use]
    pub fn is_embedded_solana_wallet(&self) -> bool {
        self.is_embedded_wallet()
            && (self.chain_id.as_deref().is_some_and(|c| c.starts_with("solana"))
                || matches!(self.wallet_client_type.as_deref(), Some("phantom" | "solana")))
    }
}

/// A user record returned by the identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityUser {
    /// Provider-assigned user id.
    pub id: String,
    /// Linked wallets and accounts.
    pub linked_accounts: Vec<LinkedAccount>,
}

impl IdentityUser {
    /// First embedded EVM wallet address, if any.
    #[must_use]
    pub fn embedded_evm_address(&self) -> Option<&str> {
        self.linked_accounts
            .iter()
            .find(|a| a.is_embedded_evm_wallet())
            .and_then(|a| a.address.as_deref())
    }

    /// First embedded Solana wallet address, if any.
    #[must_use]
    pub fn embedded_solana_address(&self) -> Option<&str> {
        self.linked_accounts
            .iter()
            .find(|a| a.is_embedded_solana_wallet())
            .and_then(|a| a.address.as_deref())
    }
}

/// Errors from an identity lookup.
///
/// These never escape [`resolve_deposit_addresses`]; they exist so provider
/// implementations can report what happened for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No identity exists for the given identifier.
    #[error("identity not found")]
    NotFound,

    /// The provider could not be reached or returned an invalid response.
    #[error("identity provider unavailable: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Boundary to the external identity/session provider.
pub trait IdentityProvider: Send + Sync {
    /// Looks up a user by provider-assigned id.
    fn user_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<IdentityUser, IdentityError>> + Send;

    /// Looks up a user by email address.
    fn user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<IdentityUser, IdentityError>> + Send;
}

/// How a user is identified for deposit-address resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdentifier {
    /// Provider-assigned user id.
    UserId(String),
    /// Email address.
    Email(String),
}

impl UserIdentifier {
    /// Builds an identifier from optional request fields, preferring the user
    /// id, then the email, then the `"anonymous"` placeholder.
    #[must_use]
    pub fn from_parts(user_id: Option<String>, email: Option<String>) -> Self {
        match (user_id, email) {
            (Some(id), _) if !id.is_empty() => Self::UserId(id),
            (_, Some(email)) if !email.is_empty() => Self::Email(email),
            _ => Self::UserId("anonymous".to_owned()),
        }
    }

    /// The raw key string, used as the deterministic fallback seed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::UserId(id) => id,
            Self::Email(email) => email,
        }
    }
}

/// Where the resolved addresses came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSource {
    /// At least one address came from an embedded wallet record.
    Embedded,
    /// All addresses were derived deterministically.
    Derived,
}

/// Per-user deposit addresses for every requested chain and token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressSet {
    /// chain -> token -> address.
    pub deposit_addresses: BTreeMap<Chain, BTreeMap<Token, String>>,
    /// The EVM-family address assigned to `eip155` chains.
    pub default_evm_address: String,
    /// The Solana-family address assigned to `solana` chains.
    pub default_sol_address: String,
    /// Provenance of the addresses.
    pub source: AddressSource,
}

/// Resolves deposit addresses for a user across the requested chains/tokens.
///
/// Looks the identifier up against the identity provider and uses its
/// embedded wallet addresses where present. If the lookup fails in any way,
/// or an address family has no embedded wallet, that family's address is
/// derived deterministically from the identifier - so this function cannot
/// fail, and repeated calls with an unavailable provider return the same set.
pub async fn resolve_deposit_addresses<I: IdentityProvider>(
    provider: &I,
    identifier: &UserIdentifier,
    chains: &[Chain],
    tokens: &[Token],
) -> DepositAddressSet {
    let lookup = match identifier {
        UserIdentifier::UserId(id) => provider.user_by_id(id).await,
        UserIdentifier::Email(email) => provider.user_by_email(email).await,
    };

    let key = identifier.key();
    let (evm, sol, source) = match lookup {
        Ok(user) => {
            let evm = user.embedded_evm_address().map(str::to_owned);
            let sol = user.embedded_solana_address().map(str::to_owned);
            if evm.is_none() && sol.is_none() {
                tracing::debug!(identifier = key, "no embedded wallets linked; deriving addresses");
                derived(key)
            } else {
                (
                    evm.unwrap_or_else(|| pseudo::evm_fallback_address(key)),
                    sol.unwrap_or_else(|| pseudo::sol_fallback_address(key)),
                    AddressSource::Embedded,
                )
            }
        }
        Err(err) => {
            tracing::warn!(identifier = key, error = %err, "identity lookup failed; deriving addresses");
            derived(key)
        }
    };

    let deposit_addresses = chains
        .iter()
        .map(|&chain| {
            let address = match chain.family() {
                ChainFamily::Evm => &evm,
                ChainFamily::Solana => &sol,
            };
            let per_token = tokens.iter().map(|&t| (t, address.clone())).collect();
            (chain, per_token)
        })
        .collect();

    DepositAddressSet {
        deposit_addresses,
        default_evm_address: evm,
        default_sol_address: sol,
        source,
    }
}

fn derived(key: &str) -> (String, String, AddressSource) {
    (
        pseudo::evm_fallback_address(key),
        pseudo::sol_fallback_address(key),
        AddressSource::Derived,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ALL_CHAINS, ALL_TOKENS};

    struct Unavailable;

    impl IdentityProvider for Unavailable {
        async fn user_by_id(&self, _id: &str) -> Result<IdentityUser, IdentityError> {
            Err(IdentityError::Provider("connection refused".into()))
        }
        async fn user_by_email(&self, _email: &str) -> Result<IdentityUser, IdentityError> {
            Err(IdentityError::Provider("connection refused".into()))
        }
    }

    struct Fixed(IdentityUser);

    impl IdentityProvider for Fixed {
        async fn user_by_id(&self, _id: &str) -> Result<IdentityUser, IdentityError> {
            Ok(self.0.clone())
        }
        async fn user_by_email(&self, _email: &str) -> Result<IdentityUser, IdentityError> {
            Ok(self.0.clone())
        }
    }

    fn embedded_wallet(chain_id: &str, address: &str) -> LinkedAccount {
        LinkedAccount {
            kind: "wallet".into(),
            connector_type: Some("embedded".into()),
            chain_id: Some(chain_id.into()),
            wallet_client_type: None,
            address: Some(address.into()),
        }
    }

    #[tokio::test]
    async fn fallback_is_consistent_when_provider_is_down() {
        let identifier = UserIdentifier::UserId("did:privy:abc123".into());
        let first =
            resolve_deposit_addresses(&Unavailable, &identifier, &ALL_CHAINS, &ALL_TOKENS).await;
        let second =
            resolve_deposit_addresses(&Unavailable, &identifier, &ALL_CHAINS, &ALL_TOKENS).await;
        assert_eq!(first, second);
        assert_eq!(first.source, AddressSource::Derived);
        assert_ne!(first.default_evm_address, first.default_sol_address);
    }

    #[tokio::test]
    async fn every_requested_chain_and_token_gets_an_address() {
        let identifier = UserIdentifier::Email("alice@example.com".into());
        let set =
            resolve_deposit_addresses(&Unavailable, &identifier, &ALL_CHAINS, &ALL_TOKENS).await;
        for chain in ALL_CHAINS {
            let per_token = set.deposit_addresses.get(&chain).unwrap();
            for token in ALL_TOKENS {
                let address = per_token.get(&token).unwrap();
                let expected = match chain.family() {
                    ChainFamily::Evm => &set.default_evm_address,
                    ChainFamily::Solana => &set.default_sol_address,
                };
                assert_eq!(address, expected);
            }
        }
    }

    #[tokio::test]
    async fn embedded_wallets_take_precedence() {
        let user = IdentityUser {
            id: "u1".into(),
            linked_accounts: vec![
                embedded_wallet("eip155:84532", "0x1111111111111111111111111111111111111111"),
                embedded_wallet("solana:101", "So1anaAddr1111111111111111111111111111111111"),
            ],
        };
        let identifier = UserIdentifier::UserId("u1".into());
        let set = resolve_deposit_addresses(&Fixed(user), &identifier, &ALL_CHAINS, &ALL_TOKENS)
            .await;
        assert_eq!(set.source, AddressSource::Embedded);
        assert_eq!(set.default_evm_address, "0x1111111111111111111111111111111111111111");
        assert_eq!(set.default_sol_address, "So1anaAddr1111111111111111111111111111111111");
    }

    #[tokio::test]
    async fn missing_family_is_derived() {
        let user = IdentityUser {
            id: "u2".into(),
            linked_accounts: vec![embedded_wallet(
                "eip155:84532",
                "0x2222222222222222222222222222222222222222",
            )],
        };
        let identifier = UserIdentifier::UserId("u2".into());
        let set = resolve_deposit_addresses(&Fixed(user), &identifier, &ALL_CHAINS, &ALL_TOKENS)
            .await;
        assert_eq!(set.source, AddressSource::Embedded);
        assert_eq!(set.default_evm_address, "0x2222222222222222222222222222222222222222");
        assert_eq!(set.default_sol_address, pseudo::sol_fallback_address("u2"));
    }

    #[tokio::test]
    async fn non_embedded_wallets_are_ignored() {
        let user = IdentityUser {
            id: "u3".into(),
            linked_accounts: vec![LinkedAccount {
                kind: "wallet".into(),
                connector_type: Some("injected".into()),
                chain_id: Some("eip155:1".into()),
                wallet_client_type: Some("metamask".into()),
                address: Some("0x3333333333333333333333333333333333333333".into()),
            }],
        };
        let identifier = UserIdentifier::UserId("u3".into());
        let set = resolve_deposit_addresses(&Fixed(user), &identifier, &ALL_CHAINS, &ALL_TOKENS)
            .await;
        assert_eq!(set.source, AddressSource::Derived);
    }

    #[test]
    fn identifier_from_parts_prefers_user_id() {
        assert_eq!(
            UserIdentifier::from_parts(Some("u1".into()), Some("a@b.c".into())),
            UserIdentifier::UserId("u1".into())
        );
        assert_eq!(
            UserIdentifier::from_parts(None, Some("a@b.c".into())),
            UserIdentifier::Email("a@b.c".into())
        );
        assert_eq!(
            UserIdentifier::from_parts(None, None),
            UserIdentifier::UserId("anonymous".into())
        );
    }
}
