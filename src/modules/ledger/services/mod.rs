pub mod funds_service;

pub use funds_service::FundsService;
