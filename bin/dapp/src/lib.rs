pub mod amount;
pub mod config;
pub mod layout;
pub mod metrics;
pub mod pages;
pub mod shell;
pub mod toast;

pub use pages::{ApprovePage, BalancePage, ChainPage, Page};
pub use shell::{AppContext, AppShell, NETWORK_ERROR};
