//! Solidity interface definitions for on-chain interactions.
//!
//! Contains the minimal ERC-20 surface the wallet stack actually touches:
//! `balanceOf` and `decimals` for balance reads, `transfer` for withdrawals.

use alloy_sol_types::sol;

sol! {
    /// Minimal ERC-20 interface.
    ///
    /// Only the functions used by the balance fetcher and the withdrawal
    /// builder are declared.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function transfer(address to, uint256 value) external returns (bool);
    }
}
