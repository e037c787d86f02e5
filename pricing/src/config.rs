#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};
use crate::solvers::SolverConfig;

pub const DEFAULT_LATTICE_STEPS: usize = 10;
pub const DEFAULT_BUMP_SIZE: f64 = 0.01;

/// Settings shared by the pricers and risk calculations, overridable per call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub solver: SolverConfig,
    /// time steps of the binomial lattice
    pub lattice_steps: usize,
    /// yield or parameter shift used by finite difference risk figures
    pub bump_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            lattice_steps: DEFAULT_LATTICE_STEPS,
            bump_size: DEFAULT_BUMP_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_lattice_steps(mut self, lattice_steps: usize) -> Self {
        self.lattice_steps = lattice_steps;
        self
    }

    pub fn with_bump_size(mut self, bump_size: f64) -> Self {
        self.bump_size = bump_size;
        self
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.lattice_steps == 0 {
            return Err(PricingError::invalid_configuration("lattice steps", 0));
        }
        if !(self.bump_size.is_finite() && self.bump_size > 0.0) {
            return Err(PricingError::invalid_configuration("bump size", self.bump_size));
        }
        if !(self.solver.tolerance.is_finite() && self.solver.tolerance > 0.0) {
            return Err(PricingError::invalid_configuration(
                "solver tolerance",
                self.solver.tolerance,
            ));
        }
        Ok(())
    }
}
