//! Paykesh payroll deduction and settlement engine
//!
//! Computes statutory payroll deductions under effective-dated tax
//! configs and settles the resulting payouts through a mobile-money
//! provider, tracking funds in a two-balance ledger until the provider
//! confirms final state.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::ledger;
pub use modules::payroll;
pub use modules::providers;
pub use modules::taxes;
pub use modules::webhooks;
