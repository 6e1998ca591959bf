pub mod sweeper;

pub use sweeper::ReconciliationSweeper;
