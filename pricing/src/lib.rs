//! Fair values and sensitivities of vanilla options and fixed coupon bonds.
//!
//! - [`analytic`]: Black-Scholes-Merton prices, greeks and implied volatility
//! - [`lattice`]: Cox-Ross-Rubinstein binomial tree for European and American exercise
//! - [`bonds`]: cash flows, price from yield and yield to maturity
//! - [`solvers`]: the Newton-Raphson root finder behind both inversions
//! - [`option`]: picks the pricer for an exercise style and pricing method
//!
//! Every call works on an immutable snapshot of its inputs and keeps its
//! working memory local, so independent calls can run on any number of threads.

pub mod analytic;
pub mod bonds;
pub mod common;
pub mod config;
pub mod error;
pub mod lattice;
pub mod option;
pub mod solvers;

pub use common::models::{BondSpec, OptionClass, OptionRight, OptionSpec, PricingMethod};
pub use config::EngineConfig;
pub use error::{PricingError, PricingResult};
pub use solvers::{RootFindResult, SolverConfig};
