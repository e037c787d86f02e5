use crate::error::{RiskError, RiskResult};

/// Smallest denominator accepted when no threshold is given.
const DIVISION_THRESHOLD: f64 = 1e-12;

/// `numerator / denominator` unless the denominator is too close to 0.
/// Use the threshold for the division; without one a tiny default applies.
pub(crate) fn checked_ratio(
    numerator: f64,
    denominator: f64,
    threshold: Option<f64>,
) -> RiskResult<f64> {
    let threshold = threshold.unwrap_or(DIVISION_THRESHOLD);
    if !(denominator.abs() >= threshold) {
        return Err(RiskError::ZeroDivision);
    }
    Ok(numerator / denominator)
}

pub(crate) fn check_bump(bump: f64) -> RiskResult<f64> {
    if bump.is_finite() && bump > 0.0 {
        Ok(bump)
    } else {
        Err(RiskError::InvalidBump { bump })
    }
}

/// A value revalued with one input shifted down and up by `bump`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BumpedValues {
    pub base: f64,
    pub down: f64,
    pub up: f64,
    pub bump: f64,
}

impl BumpedValues {
    /// Revalues `value_at` at `x - bump`, `x` and `x + bump`.
    pub fn evaluate<F, E>(x: f64, bump: f64, value_at: F) -> RiskResult<Self>
    where
        F: Fn(f64) -> Result<f64, E>,
        RiskError: From<E>,
    {
        let bump = check_bump(bump)?;
        Ok(Self {
            base: value_at(x)?,
            down: value_at(x - bump)?,
            up: value_at(x + bump)?,
            bump,
        })
    }

    /// First derivative by central difference.
    pub fn slope(&self) -> f64 {
        (self.up - self.down) / (2.0 * self.bump)
    }

    /// Second derivative by central difference.
    pub fn curvature(&self) -> f64 {
        (self.up + self.down - 2.0 * self.base) / self.bump.powi(2)
    }
}
