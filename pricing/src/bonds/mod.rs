//! Fixed coupon bonds: cash flow schedule, price from yield and yield from price.

pub mod cashflow;
pub mod valuation;

pub use cashflow::{BondTerms, Cashflow, CashflowSchedule};
pub use valuation::{price, yield_to_maturity, yield_to_maturity_with, YTM_INITIAL_GUESS};
