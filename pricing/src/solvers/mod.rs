//! Newton-Raphson root finding, shared by the implied volatility and the
//! yield to maturity calculations.

mod newton;

pub use newton::{newton_raphson, newton_raphson_numerical, solve};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOLERANCE: f64 = 1e-5;
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Step of the central difference used when no derivative is supplied.
pub const NUMERICAL_DERIVATIVE_STEP: f64 = 1e-6;

/// Below this the derivative is treated as zero and the iteration stops.
pub const MIN_DERIVATIVE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// stop as soon as `|f(x)| < tolerance`
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Outcome of a root search. A search that did not converge is not an error:
/// `value` then holds the last iterate and the caller decides what to report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootFindResult {
    pub converged: bool,
    pub value: f64,
    pub iterations: u32,
}

impl RootFindResult {
    pub(crate) fn converged(value: f64, iterations: u32) -> Self {
        Self {
            converged: true,
            value,
            iterations,
        }
    }

    pub(crate) fn failed(value: f64, iterations: u32) -> Self {
        Self {
            converged: false,
            value,
            iterations,
        }
    }

    /// The root if the search converged.
    pub fn root(&self) -> Option<f64> {
        self.converged.then_some(self.value)
    }
}
