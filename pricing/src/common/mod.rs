pub mod models;

pub use models::{BondSpec, OptionClass, OptionRight, OptionSpec, PricingMethod};
