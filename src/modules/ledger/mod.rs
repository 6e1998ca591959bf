pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Account, Direction, SettlementOutcome, Transaction, TransactionStatus};
pub use repositories::{LedgerStore, Resolution};
pub use services::FundsService;
