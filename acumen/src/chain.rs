//! Chain and token identifiers.
//!
//! Chains and tokens are closed enums: the set of supported networks is the
//! single source of truth for valid identifiers, so an invalid combination is
//! a construction-time error rather than a runtime fallback.
//!
//! - [`Chain`] - A supported blockchain network
//! - [`ChainFamily`] - The address/transport family a chain belongs to
//! - [`NativeFamily`] - The pricing family of a chain's native coin
//! - [`Token`] - A supported fungible token
//!
//! # Serialization
//!
//! [`Chain`] serializes to its CAIP-2 identifier (`"eip155:84532"`);
//! deserialization also accepts the bare numeric reference (`"84532"`) and
//! the human-readable network slug (`"base"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A supported blockchain network.
///
/// Each variant carries a fixed CAIP-2 identity (`namespace:reference`).
/// Parsing an identifier outside this set fails with [`ChainNotFoundError`];
/// use [`Chain::parse_or_default`] where the legacy default-chain leniency is
/// genuinely wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chain {
    /// Ethereum Sepolia testnet (`eip155:11155111`).
    EthereumSepolia,
    /// Base Sepolia testnet (`eip155:84532`).
    BaseSepolia,
    /// Polygon Amoy testnet (`eip155:80002`).
    PolygonAmoy,
    /// BNB Chain testnet (`eip155:97`).
    BnbTestnet,
    /// Solana devnet (`solana:101`).
    SolanaDevnet,
}

/// The address/transport family a chain belongs to.
///
/// Families differ in address format and in the protocol client required to
/// query them; the EVM transport cannot serve Solana-family chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    /// EVM-compatible chains (`0x`-prefixed 20-byte addresses, JSON-RPC).
    Evm,
    /// Solana chains (base58 addresses, separate protocol client).
    Solana,
}

/// The pricing family of a chain's native coin.
///
/// Native coins are priced once per family, not once per chain: the ETH-style
/// testnets share one quote and the Polygon native coin is quoted separately.
/// The Solana family has no entry because its balances are always zero under
/// the EVM transport and therefore never contribute to the portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NativeFamily {
    /// Ether and ETH-denominated testnet coins.
    Ether,
    /// The Polygon ecosystem token (POL).
    Pol,
}

/// A supported fungible token.
///
/// Both supported tokens are dollar stablecoins, which is what makes the
/// price-independent "cash" computation possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// USD Coin.
    Usdc,
    /// Tether.
    Usdt,
}

/// All supported chains, in registry order.
pub const ALL_CHAINS: [Chain; 5] = [
    Chain::EthereumSepolia,
    Chain::BaseSepolia,
    Chain::PolygonAmoy,
    Chain::BnbTestnet,
    Chain::SolanaDevnet,
];

/// All supported tokens.
pub const ALL_TOKENS: [Token; 2] = [Token::Usdc, Token::Usdt];

impl Chain {
    /// The chain every lenient lookup resolves to.
    pub const DEFAULT: Self = Self::BaseSepolia;

    /// Returns the CAIP-2 namespace component (`"eip155"` or `"solana"`).
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::EthereumSepolia | Self::BaseSepolia | Self::PolygonAmoy | Self::BnbTestnet => {
                "eip155"
            }
            Self::SolanaDevnet => "solana",
        }
    }

    /// Returns the CAIP-2 reference component (`"84532"` for Base Sepolia).
    #[must_use]
    pub const fn reference(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "11155111",
            Self::BaseSepolia => "84532",
            Self::PolygonAmoy => "80002",
            Self::BnbTestnet => "97",
            Self::SolanaDevnet => "101",
        }
    }

    /// Returns the numeric chain id.
    #[must_use]
    pub const fn numeric_id(self) -> u64 {
        match self {
            Self::EthereumSepolia => 11_155_111,
            Self::BaseSepolia => 84_532,
            Self::PolygonAmoy => 80_002,
            Self::BnbTestnet => 97,
            Self::SolanaDevnet => 101,
        }
    }

    /// Returns the human-readable network slug (`"base"`, `"solana-devnet"`).
    #[must_use]
    pub const fn network_name(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "ethereum",
            Self::BaseSepolia => "base",
            Self::PolygonAmoy => "polygon-amoy",
            Self::BnbTestnet => "bnb",
            Self::SolanaDevnet => "solana-devnet",
        }
    }

    /// Returns the address/transport family of this chain.
    #[must_use]
    pub const fn family(self) -> ChainFamily {
        match self {
            Self::EthereumSepolia | Self::BaseSepolia | Self::PolygonAmoy | Self::BnbTestnet => {
                ChainFamily::Evm
            }
            Self::SolanaDevnet => ChainFamily::Solana,
        }
    }

    /// Returns the pricing family of this chain's native coin, if it has one.
    #[must_use]
    pub const fn native_family(self) -> Option<NativeFamily> {
        match self {
            Self::EthereumSepolia | Self::BaseSepolia | Self::BnbTestnet => {
                Some(NativeFamily::Ether)
            }
            Self::PolygonAmoy => Some(NativeFamily::Pol),
            Self::SolanaDevnet => None,
        }
    }

    /// Parses an identifier, resolving anything unknown to [`Chain::DEFAULT`].
    ///
    /// This is the explicit leniency wrapper for free-form input on the HTTP
    /// boundary. Everywhere else, prefer the fail-closed [`FromStr`] parse:
    /// an unknown chain silently becoming Base Sepolia is exactly the kind of
    /// misconfiguration that should surface as an error.
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or(Self::DEFAULT)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace(), self.reference())
    }
}

/// Error returned when an identifier does not name a supported chain.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown chain identifier {0:?}")]
pub struct ChainNotFoundError(String);

impl FromStr for Chain {
    type Err = ChainNotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reference = match s.split_once(':') {
            Some((namespace, reference)) => {
                let chain = reference_to_chain(reference);
                match chain {
                    Some(c) if c.namespace() == namespace => return Ok(c),
                    _ => return Err(ChainNotFoundError(s.into())),
                }
            }
            None => s,
        };
        reference_to_chain(reference)
            .or_else(|| ALL_CHAINS.into_iter().find(|c| c.network_name() == reference))
            .ok_or_else(|| ChainNotFoundError(s.into()))
    }
}

fn reference_to_chain(reference: &str) -> Option<Chain> {
    ALL_CHAINS.into_iter().find(|c| c.reference() == reference)
}

impl Serialize for Chain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

impl Token {
    /// Returns the lowercase token id (`"usdc"`).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Usdc => "usdc",
            Self::Usdt => "usdt",
        }
    }

    /// Returns the uppercase ticker symbol (`"USDC"`).
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usdc => "USDC",
            Self::Usdt => "USDT",
        }
    }

    /// Returns `true` for dollar stablecoins counted toward cash.
    ///
    /// Currently every supported token is a stablecoin; the predicate exists
    /// so the cash computation stays correct if a volatile token is added.
    #[must_use]
    pub const fn is_stablecoin(self) -> bool {
        match self {
            Self::Usdc | Self::Usdt => true,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when an identifier does not name a supported token.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown token identifier {0:?}")]
pub struct TokenNotFoundError(String);

impl FromStr for Token {
    type Err = TokenNotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usdc" => Ok(Self::Usdc),
            "usdt" => Ok(Self::Usdt),
            _ => Err(TokenNotFoundError(s.into())),
        }
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_caip2() {
        let chain: Chain = "eip155:84532".parse().unwrap();
        assert_eq!(chain, Chain::BaseSepolia);

        let chain: Chain = "solana:101".parse().unwrap();
        assert_eq!(chain, Chain::SolanaDevnet);
    }

    #[test]
    fn parse_numeric_reference() {
        let chain: Chain = "11155111".parse().unwrap();
        assert_eq!(chain, Chain::EthereumSepolia);

        let chain: Chain = "97".parse().unwrap();
        assert_eq!(chain, Chain::BnbTestnet);
    }

    #[test]
    fn parse_network_slug() {
        let chain: Chain = "base".parse().unwrap();
        assert_eq!(chain, Chain::BaseSepolia);

        let chain: Chain = "polygon-amoy".parse().unwrap();
        assert_eq!(chain, Chain::PolygonAmoy);
    }

    #[test]
    fn parse_unknown_fails_closed() {
        assert!("eip155:1".parse::<Chain>().is_err());
        assert!("8453".parse::<Chain>().is_err());
        assert!("".parse::<Chain>().is_err());
    }

    #[test]
    fn parse_mismatched_namespace_fails() {
        // Right reference, wrong namespace: not a supported chain.
        assert!("solana:84532".parse::<Chain>().is_err());
        assert!("eip155:101".parse::<Chain>().is_err());
    }

    #[test]
    fn parse_or_default_resolves_unknown_to_base_sepolia() {
        assert_eq!(Chain::parse_or_default("eip155:999999"), Chain::BaseSepolia);
        assert_eq!(Chain::parse_or_default("80002"), Chain::PolygonAmoy);
    }

    #[test]
    fn display_roundtrip() {
        for chain in ALL_CHAINS {
            let parsed: Chain = chain.to_string().parse().unwrap();
            assert_eq!(parsed, chain);
        }
    }

    #[test]
    fn serde_uses_caip2() {
        let json = serde_json::to_string(&Chain::PolygonAmoy).unwrap();
        assert_eq!(json, "\"eip155:80002\"");

        let chain: Chain = serde_json::from_str("\"solana:101\"").unwrap();
        assert_eq!(chain, Chain::SolanaDevnet);
    }

    #[test]
    fn family_split() {
        assert_eq!(Chain::BnbTestnet.family(), ChainFamily::Evm);
        assert_eq!(Chain::SolanaDevnet.family(), ChainFamily::Solana);
    }

    #[test]
    fn native_families() {
        assert_eq!(Chain::EthereumSepolia.native_family(), Some(NativeFamily::Ether));
        assert_eq!(Chain::BaseSepolia.native_family(), Some(NativeFamily::Ether));
        assert_eq!(Chain::PolygonAmoy.native_family(), Some(NativeFamily::Pol));
        assert_eq!(Chain::SolanaDevnet.native_family(), None);
    }

    #[test]
    fn token_parse() {
        assert_eq!("usdc".parse::<Token>().unwrap(), Token::Usdc);
        assert_eq!("USDT".parse::<Token>().unwrap(), Token::Usdt);
        assert!("dai".parse::<Token>().is_err());
    }
}
