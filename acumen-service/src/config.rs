//! Service configuration.
//!
//! Loads configuration from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! strategy = "first_signin_unique"
//! supported_chains = ["eip155:11155111", "eip155:84532", "eip155:80002", "eip155:97", "solana:101"]
//! supported_tokens = ["usdc", "usdt"]
//! alchemy_api_key = "$ALCHEMY_API_KEY"
//!
//! [identity]
//! app_id = "$PRIVY_APP_ID"
//! app_secret = "$PRIVY_APP_SECRET"
//!
//! [chains."eip155:84532"]
//! rpc_url = "https://sepolia.base.org"
//! usdc = "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `config.toml`)
//! - `HOST` — Override server bind address
//! - `PORT` — Override server port
//! - Secrets referenced by `$VAR` in the config file

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use acumen::chain::{ALL_CHAINS, ALL_TOKENS, Chain, Token};
use acumen::registry::{ChainOverride, ChainRegistry};
use acumen_http::PrivyConfig;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `8080`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deposit-address assignment strategy label, echoed in session
    /// responses (default: `first_signin_unique`).
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Chains offered for deposits and balance aggregation.
    ///
    /// Parsed fail-closed: an unknown chain identifier is a startup error,
    /// not a silent default.
    #[serde(default = "default_supported_chains")]
    pub supported_chains: Vec<Chain>,

    /// Tokens offered for deposits.
    #[serde(default = "default_supported_tokens")]
    pub supported_tokens: Vec<Token>,

    /// Alchemy API key; when set, RPC traffic routes through Alchemy.
    #[serde(default)]
    pub alchemy_api_key: Option<String>,

    /// Identity-provider credentials. When absent, lookups fail and every
    /// session resolves to deterministic fallback addresses.
    #[serde(default)]
    pub identity: Option<PrivyConfig>,

    /// Price API base URL override.
    #[serde(default)]
    pub price_api_url: Option<String>,

    /// Per-chain overrides keyed by CAIP-2 identifier.
    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,
}

/// Per-chain configuration overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// HTTP RPC endpoint URL.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// WebSocket RPC endpoint URL.
    #[serde(default)]
    pub ws_rpc_url: Option<String>,

    /// Block explorer base URL.
    #[serde(default)]
    pub explorer_url: Option<String>,

    /// USDC contract address override.
    #[serde(default)]
    pub usdc: Option<String>,

    /// USDT contract address override.
    #[serde(default)]
    pub usdt: Option<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    8080
}

fn default_strategy() -> String {
    "first_signin_unique".to_owned()
}

fn default_supported_chains() -> Vec<Chain> {
    ALL_CHAINS.to_vec()
}

fn default_supported_tokens() -> Vec<Token> {
    ALL_TOKENS.to_vec()
}

impl ServiceConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// After loading, all string values with `$VAR` / `${VAR}` references
    /// are expanded from the process environment. `HOST` and `PORT` env vars
    /// override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            // If no config file exists, use empty TOML and rely on defaults
            String::new()
        };

        let expanded = expand_env_vars(&content);
        let mut config: Self = toml::from_str(&expanded)?;

        if let Ok(host) = std::env::var("HOST") {
            if let Ok(addr) = host.parse() {
                config.host = addr;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        Ok(config)
    }

    /// Assembles the immutable chain registry from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`acumen::chain::ChainNotFoundError`] if a `[chains]` table
    /// names an unsupported chain.
    pub fn build_registry(&self) -> Result<ChainRegistry, acumen::chain::ChainNotFoundError> {
        let key = self
            .alchemy_api_key
            .as_deref()
            .map(str::trim)
            // A still-unexpanded "$VAR" means the env var was never set.
            .filter(|k| !k.is_empty() && !k.starts_with('$'));
        let mut registry = match key {
            Some(key) => ChainRegistry::with_alchemy_key(key),
            None => ChainRegistry::with_defaults(),
        };

        for (chain_id, chain_config) in &self.chains {
            let chain: Chain = chain_id.parse()?;
            let tokens = chain_config.token_overrides(registry.descriptor(chain).tokens.clone());
            registry.apply_override(
                chain,
                ChainOverride {
                    http_rpc_url: chain_config.rpc_url.clone(),
                    ws_rpc_url: chain_config.ws_rpc_url.clone(),
                    explorer_url: chain_config.explorer_url.clone(),
                    tokens,
                },
            );
        }
        Ok(registry)
    }
}

impl ChainConfig {
    /// Merges token address overrides into an existing token table.
    fn token_overrides(
        &self,
        mut tokens: BTreeMap<Token, String>,
    ) -> Option<BTreeMap<Token, String>> {
        if self.usdc.is_none() && self.usdt.is_none() {
            return None;
        }
        if let Some(usdc) = &self.usdc {
            tokens.insert(Token::Usdc, usdc.clone());
        }
        if let Some(usdt) = &self.usdt {
            tokens.insert(Token::Usdt, usdt.clone());
        }
        Some(tokens)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            let braced = chars.peek() == Some(&'{');
            if braced {
                chars.next(); // consume '{'
            }

            let mut var_name = String::new();
            while let Some(&c) = chars.peek() {
                if braced {
                    if c == '}' {
                        chars.next();
                        break;
                    }
                } else if !c.is_ascii_alphanumeric() && c != '_' {
                    break;
                }
                var_name.push(c);
                chars.next();
            }

            if var_name.is_empty() {
                result.push('$');
                if braced {
                    result.push('{');
                }
            } else if let Ok(val) = std::env::var(&var_name) {
                result.push_str(&val);
            } else {
                // Leave unresolved variable as-is
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced {
                    result.push('}');
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.supported_chains, ALL_CHAINS.to_vec());
        assert_eq!(config.supported_tokens, ALL_TOKENS.to_vec());
        assert!(config.identity.is_none());
    }

    #[test]
    fn unknown_supported_chain_is_a_parse_error() {
        let result: Result<ServiceConfig, _> =
            toml::from_str(r#"supported_chains = ["eip155:1"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn chain_overrides_merge_into_the_registry() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [chains."eip155:84532"]
            rpc_url = "http://localhost:8545"
            usdc = "0x0000000000000000000000000000000000000001"
            "#,
        )
        .unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.http_rpc_url(Chain::BaseSepolia), "http://localhost:8545");
        assert_eq!(
            registry.token_address(Chain::BaseSepolia, Token::Usdc),
            Some("0x0000000000000000000000000000000000000001")
        );
        // USDT keeps its default when only USDC is overridden.
        assert_eq!(
            registry.token_address(Chain::BaseSepolia, Token::Usdt),
            Some("0x2d82C4b9ff582d02CC89675f2D086Cb7953A555a")
        );
    }

    #[test]
    fn unresolved_alchemy_key_falls_back_to_public_rpc() {
        let config: ServiceConfig =
            toml::from_str(r#"alchemy_api_key = "$ALCHEMY_API_KEY_UNSET_FOR_TEST""#).unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.http_rpc_url(Chain::BaseSepolia), "https://sepolia.base.org");
    }

    #[test]
    fn expands_known_variables_and_preserves_unknown() {
        let expanded = expand_env_vars("p = \"$PATH\"");
        assert!(!expanded.contains("$PATH"));
        assert_eq!(expand_env_vars("x = \"$UNSET_VAR_12345\""), "x = \"$UNSET_VAR_12345\"");
        assert_eq!(expand_env_vars("x = \"${UNSET_VAR_12345}\""), "x = \"${UNSET_VAR_12345}\"");
    }
}
