#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the Acumen multi-chain wallet subsystem.
//!
//! This crate provides the blockchain-agnostic foundation used throughout the
//! wallet stack: chain and token identifiers, the static chain registry,
//! exact base-unit conversion, the deterministic pseudo-address generator,
//! the balance/portfolio data model, and the aggregation logic that fans
//! balance fetches out across chains.
//!
//! Chain-specific transports and outbound HTTP clients live in separate
//! crates (`acumen-evm`, `acumen-http`); they plug into the trait seams
//! defined here ([`portfolio::BalanceSource`], [`portfolio::PriceOracle`],
//! [`identity::IdentityProvider`]).
//!
//! # Modules
//!
//! - [`chain`] - Chain and token identifiers (closed enums, CAIP-2 parsing)
//! - [`registry`] - Per-chain RPC/explorer/token-contract configuration
//! - [`units`] - Exact conversion between raw integer and decimal amounts
//! - [`pseudo`] - Deterministic pseudo-address generation
//! - [`balance`] - Balance snapshot and portfolio types
//! - [`identity`] - Identity-provider boundary and deposit-address resolution
//! - [`portfolio`] - Multi-chain balance aggregation

pub mod balance;
pub mod chain;
pub mod identity;
pub mod portfolio;
pub mod pseudo;
pub mod registry;
pub mod units;
