pub mod calculator;

pub use calculator::{PayrollCalculator, PayrollInput};
