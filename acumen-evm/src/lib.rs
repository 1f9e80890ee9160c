#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM (EIP-155) support for the Acumen wallet stack.
//!
//! Implements the core trait seams for EVM-compatible chains on the alloy
//! stack:
//!
//! - [`EvmBalanceSource`] fetches native and ERC-20 balances for one
//!   `(address, chain)` pair, tolerating per-token failure
//! - [`WithdrawalBuilder`] turns a withdrawal request into an encoded ERC-20
//!   `transfer` call for an external signing backend
//!
//! Solana-family chains require a different protocol client entirely; this
//! crate reports their balances as zero and cannot build withdrawals for
//! them.

pub mod balance;
pub mod contract;
pub mod withdraw;

pub use balance::{BalanceFetchError, EvmBalanceSource};
pub use withdraw::{SigningBackend, TransferCall, WithdrawError, WithdrawalBuilder, WithdrawalRequest};
