pub mod controllers;
pub mod models;
pub mod services;

pub use models::{DeductionLine, EarningsBreakdown, PayrollLineItem};
pub use services::{PayrollCalculator, PayrollInput};
