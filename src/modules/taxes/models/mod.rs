pub mod tax_config;

pub use tax_config::{GraduatedBand, RateModel, TaxConfig, TaxType, TierBand};
