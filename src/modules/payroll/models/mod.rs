pub mod line_item;

pub use line_item::{DeductionLine, EarningsBreakdown, PayrollLineItem};
