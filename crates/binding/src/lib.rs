//! Contract bindings for the Matic test token.
//!
//! The token is a plain ERC20 deployed from the Hardhat project. Only the
//! surface the frontend reads or writes is declared here; bindings are
//! generated with alloy's `sol!` macro.

pub mod token;

pub use token::IMatic;
