#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Outbound HTTP clients for the Acumen wallet stack.
//!
//! - [`CoinGeckoClient`] implements the core
//!   [`PriceOracle`](acumen::portfolio::PriceOracle) trait against the
//!   CoinGecko simple-price API, with documented fallback constants
//! - [`PrivyIdentityClient`] implements the core
//!   [`IdentityProvider`](acumen::identity::IdentityProvider) trait against
//!   the Privy user API

pub mod identity;
pub mod price;

pub use identity::{PrivyConfig, PrivyIdentityClient};
pub use price::CoinGeckoClient;
