use pricing::PricingError;
use thiserror::Error;

pub type RiskResult<T> = Result<T, RiskError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("division by 0")]
    ZeroDivision,
    #[error("bump size {bump} must be positive and finite")]
    InvalidBump { bump: f64 },
    #[error("lattice greeks need at least {required} steps, got {steps}")]
    TooFewSteps { required: usize, steps: usize },
    #[error(transparent)]
    Pricing(#[from] PricingError),
}
