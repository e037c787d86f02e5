//! Finite difference risk figures on top of the `pricing` crate: yield
//! sensitivities of bonds and greeks of lattice priced options.

pub mod bond_risk;
pub mod error;
pub mod lattice_greeks;
pub mod risk_figures;

pub use bond_risk::{convexity, convexity_for, duration, duration_for, DurationMeasures};
pub use error::{RiskError, RiskResult};
pub use risk_figures::BumpedValues;
