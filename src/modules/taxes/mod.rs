pub mod controllers;
pub mod models;
pub mod services;

pub use models::{RateModel, TaxConfig, TaxType};
pub use services::TaxConfigRegistry;
