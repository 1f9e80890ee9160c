//! Static per-chain configuration.
//!
//! The [`ChainRegistry`] maps every supported [`Chain`] to its RPC endpoints,
//! block explorer, and token contract addresses. It is assembled once at
//! process start - built-in defaults, optionally an Alchemy API key, then
//! config-file overrides - and is immutable afterwards, so lookups never need
//! locking and are idempotent for the process lifetime.
//!
//! Because [`Chain`] is a closed enum and the registry always carries a
//! descriptor for every variant, descriptor lookups are total. Token lookups
//! return `Option`: a chain may legitimately have no deployment for a token.

use std::collections::BTreeMap;

use crate::chain::{ALL_CHAINS, Chain, Token};

/// Configuration for one supported chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    /// The chain this descriptor belongs to.
    pub chain: Chain,
    /// Human-readable display name (e.g. `"Base Sepolia"`).
    pub display_name: String,
    /// HTTP JSON-RPC endpoint.
    pub http_rpc_url: String,
    /// WebSocket JSON-RPC endpoint (streaming subscriptions).
    pub ws_rpc_url: String,
    /// Block explorer base URL, without trailing slash.
    pub explorer_url: String,
    /// Native coin ticker (`"ETH"`, `"POL"`, `"SOL"`).
    pub native_symbol: &'static str,
    /// Token contract addresses deployed on this chain.
    ///
    /// EVM chains carry `0x`-hex contract addresses; the Solana chain carries
    /// base58 SPL mint addresses. Addresses are stored as configured and
    /// normalized to the chain's canonical format by the transport that uses
    /// them.
    pub tokens: BTreeMap<Token, String>,
}

/// Config-file override for a single chain's descriptor.
///
/// `None` fields keep the built-in default. A `Some` token map replaces the
/// whole built-in token table for that chain.
#[derive(Debug, Clone, Default)]
pub struct ChainOverride {
    /// Replacement HTTP RPC endpoint.
    pub http_rpc_url: Option<String>,
    /// Replacement WebSocket RPC endpoint.
    pub ws_rpc_url: Option<String>,
    /// Replacement explorer base URL.
    pub explorer_url: Option<String>,
    /// Replacement token contract table.
    pub tokens: Option<BTreeMap<Token, String>>,
}

/// Immutable registry of all supported chain descriptors.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    descriptors: BTreeMap<Chain, ChainDescriptor>,
}

impl ChainRegistry {
    /// Creates a registry with built-in public-RPC defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(None)
    }

    /// Creates a registry routing RPC traffic through Alchemy.
    ///
    /// Explorer URLs and token contracts keep their built-in defaults; only
    /// the RPC endpoints change.
    #[must_use]
    pub fn with_alchemy_key(api_key: &str) -> Self {
        Self::new(Some(api_key))
    }

    fn new(alchemy_api_key: Option<&str>) -> Self {
        let descriptors = ALL_CHAINS
            .into_iter()
            .map(|chain| (chain, default_descriptor(chain, alchemy_api_key)))
            .collect();
        Self { descriptors }
    }

    /// Applies a config-file override to one chain's descriptor.
    ///
    /// Meant to be called during startup assembly, before the registry is
    /// shared; the registry does not change after that point.
    pub fn apply_override(&mut self, chain: Chain, over: ChainOverride) {
        let descriptor = self
            .descriptors
            .get_mut(&chain)
            .expect("registry carries a descriptor for every chain");
        if let Some(url) = over.http_rpc_url {
            descriptor.http_rpc_url = url;
        }
        if let Some(url) = over.ws_rpc_url {
            descriptor.ws_rpc_url = url;
        }
        if let Some(url) = over.explorer_url {
            descriptor.explorer_url = url;
        }
        if let Some(tokens) = over.tokens {
            descriptor.tokens = tokens;
        }
    }

    /// Builder-style variant of [`apply_override`](Self::apply_override).
    #[must_use]
    pub fn with_override(mut self, chain: Chain, over: ChainOverride) -> Self {
        self.apply_override(chain, over);
        self
    }

    /// Returns the descriptor for a chain. Total: every [`Chain`] variant has
    /// exactly one descriptor.
    #[must_use]
    pub fn descriptor(&self, chain: Chain) -> &ChainDescriptor {
        self.descriptors
            .get(&chain)
            .expect("registry carries a descriptor for every chain")
    }

    /// Returns the HTTP RPC endpoint for a chain.
    #[must_use]
    pub fn http_rpc_url(&self, chain: Chain) -> &str {
        &self.descriptor(chain).http_rpc_url
    }

    /// Returns the WebSocket RPC endpoint for a chain.
    #[must_use]
    pub fn ws_rpc_url(&self, chain: Chain) -> &str {
        &self.descriptor(chain).ws_rpc_url
    }

    /// Returns the configured contract address for a token on a chain, or
    /// `None` if the token has no deployment there.
    #[must_use]
    pub fn token_address(&self, chain: Chain, token: Token) -> Option<&str> {
        self.descriptor(chain).tokens.get(&token).map(String::as_str)
    }

    /// Returns the explorer URL for a transaction hash on a chain.
    #[must_use]
    pub fn explorer_tx_url(&self, chain: Chain, tx_hash: &str) -> String {
        format!("{}/tx/{tx_hash}", self.descriptor(chain).explorer_url)
    }

    /// Iterates over all descriptors in chain order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.descriptors.values()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_descriptor(chain: Chain, alchemy_api_key: Option<&str>) -> ChainDescriptor {
    let (display_name, alchemy_slug, public_http, public_ws, explorer, native_symbol) = match chain
    {
        Chain::EthereumSepolia => (
            "Ethereum Sepolia",
            "eth-sepolia",
            "https://sepolia.infura.io",
            "wss://eth-sepolia.public.blastapi.io",
            "https://sepolia.etherscan.io",
            "ETH",
        ),
        Chain::BaseSepolia => (
            "Base Sepolia",
            "base-sepolia",
            "https://sepolia.base.org",
            "wss://base-sepolia.publicnode.com",
            "https://sepolia.basescan.org",
            "ETH",
        ),
        Chain::PolygonAmoy => (
            "Polygon Amoy",
            "polygon-amoy",
            "https://rpc-amoy.polygon.technology",
            "wss://polygon-amoy.publicnode.com",
            "https://amoy.polygonscan.com",
            "POL",
        ),
        Chain::BnbTestnet => (
            "BNB Testnet",
            "bnb-testnet",
            "https://data-seed-prebsc-1-s1.binance.org:8545",
            "wss://bsc-testnet.publicnode.com",
            "https://testnet.bscscan.com",
            "BNB",
        ),
        Chain::SolanaDevnet => (
            "Solana Devnet",
            "solana-devnet",
            "https://api.devnet.solana.com",
            "wss://api.devnet.solana.com",
            "https://explorer.solana.com/?cluster=devnet",
            "SOL",
        ),
    };

    let (http_rpc_url, ws_rpc_url) = match alchemy_api_key {
        Some(key) => (
            format!("https://{alchemy_slug}.g.alchemy.com/v2/{key}"),
            format!("wss://{alchemy_slug}.g.alchemy.com/v2/{key}"),
        ),
        None => (public_http.to_owned(), public_ws.to_owned()),
    };

    ChainDescriptor {
        chain,
        display_name: display_name.to_owned(),
        http_rpc_url,
        ws_rpc_url,
        explorer_url: explorer.to_owned(),
        native_symbol,
        tokens: default_tokens(chain),
    }
}

fn default_tokens(chain: Chain) -> BTreeMap<Token, String> {
    let (usdc, usdt) = match chain {
        Chain::EthereumSepolia => (
            "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238",
            "0xaA8E23Fb1079EA71e0a56F48a2aA51851D8433D0",
        ),
        Chain::BaseSepolia | Chain::BnbTestnet => (
            "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
            "0x2d82C4b9ff582d02CC89675f2D086Cb7953A555a",
        ),
        Chain::PolygonAmoy => (
            "0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582",
            "0x6C5131734E5C40a504c18c26fa96F8EBDbb0ff30",
        ),
        // SPL mints, not ERC-20 contracts.
        Chain::SolanaDevnet => (
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
        ),
    };
    BTreeMap::from([(Token::Usdc, usdc.to_owned()), (Token::Usdt, usdt.to_owned())])
}
