pub mod ledger;
pub mod notifications;
pub mod payroll;
pub mod providers;
pub mod reconciliation;
pub mod taxes;
pub mod webhooks;
