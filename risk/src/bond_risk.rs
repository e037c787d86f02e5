//! Yield sensitivities of a fixed coupon bond, by repricing at the resolved
//! yield shifted down and up.

use log::debug;
use pricing::bonds;
use pricing::config::DEFAULT_BUMP_SIZE;
use pricing::{BondSpec, EngineConfig};

use crate::error::{RiskError, RiskResult};
use crate::risk_figures::{check_bump, checked_ratio, BumpedValues};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationMeasures {
    /// Relative price change per unit of yield.
    pub modified_duration: f64,
    /// Price spread `price_down - price_up` over the two bumped yields.
    pub macaulay_duration: f64,
}

pub fn duration(spec: &BondSpec) -> RiskResult<DurationMeasures> {
    duration_with(spec, DEFAULT_BUMP_SIZE)
}

pub fn duration_with(spec: &BondSpec, bump: f64) -> RiskResult<DurationMeasures> {
    let bumped = reprice(spec, bump)?;
    let spread = bumped.down - bumped.up;
    let modified_duration = checked_ratio(spread, 2.0 * bumped.base * bumped.bump, None)?;
    debug!("{}: modified duration {}", spec, modified_duration);
    Ok(DurationMeasures {
        modified_duration,
        macaulay_duration: spread,
    })
}

/// Duration with the bump size of `config`.
pub fn duration_for(spec: &BondSpec, config: &EngineConfig) -> RiskResult<DurationMeasures> {
    config.validate()?;
    duration_with(spec, config.bump_size)
}

pub fn convexity(spec: &BondSpec) -> RiskResult<f64> {
    convexity_with(spec, DEFAULT_BUMP_SIZE)
}

pub fn convexity_with(spec: &BondSpec, bump: f64) -> RiskResult<f64> {
    let bumped = reprice(spec, bump)?;
    let convexity = checked_ratio(bumped.curvature(), bumped.base, None)?;
    debug!("{}: convexity {}", spec, convexity);
    Ok(convexity)
}

pub fn convexity_for(spec: &BondSpec, config: &EngineConfig) -> RiskResult<f64> {
    config.validate()?;
    convexity_with(spec, config.bump_size)
}

/// Quoted (or implied) price together with the prices at `y - bump` and
/// `y + bump`.
fn reprice(spec: &BondSpec, bump: f64) -> RiskResult<BumpedValues> {
    let bump = check_bump(bump)?;
    let base = spec.resolve_price()?;
    let ytm = spec.resolve_yield()?;
    if let Some(frequency) = spec.coupon_frequency {
        // y - bump must stay above the -100% per period pole
        if ytm - bump <= -(frequency as f64) {
            return Err(RiskError::InvalidBump { bump });
        }
    }
    Ok(BumpedValues {
        base,
        down: bonds::price(spec, ytm - bump)?,
        up: bonds::price(spec, ytm + bump)?,
        bump,
    })
}
