#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Wallet session, deposit-address, and balance HTTP service.
//!
//! Thin axum wrappers over the core wallet stack: the session endpoint
//! resolves per-user deposit addresses, the deposit-address endpoint mints
//! deterministic pseudo-addresses, and the balance endpoint runs the
//! multi-chain aggregation.

pub mod config;
pub mod error;
pub mod handlers;
