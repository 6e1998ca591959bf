pub mod registry;

pub use registry::TaxConfigRegistry;
