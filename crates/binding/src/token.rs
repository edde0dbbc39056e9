//! Matic token binding.

use alloy_sol_types::sol;

sol! {
    /// ERC20 surface of the `Matic` contract.
    #[sol(rpc)]
    interface IMatic {
        /// Token balance of an account, in base units
        function balanceOf(address account) external view returns (uint256);

        /// Remaining amount `spender` may move on behalf of `owner`
        function allowance(address owner, address spender) external view returns (uint256);

        /// Let `spender` move up to `amount` base units of the caller's tokens
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
