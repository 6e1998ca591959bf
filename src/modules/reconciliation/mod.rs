pub mod services;

pub use services::ReconciliationSweeper;
