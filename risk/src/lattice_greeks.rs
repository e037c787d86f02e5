//! Greeks of options priced on the binomial lattice, where no closed form
//! exists (American exercise in particular).
//!
//! Delta, gamma and theta are read off the first two steps of a single tree.
//! Vega and rho reprice the whole tree with the volatility or the rate
//! shifted down and up.

use log::debug;
use pricing::analytic::Greeks;
use pricing::config::DEFAULT_BUMP_SIZE;
use pricing::lattice::{binomial, BinomialTree};
use pricing::{EngineConfig, OptionSpec};

use crate::error::{RiskError, RiskResult};
use crate::risk_figures::{check_bump, checked_ratio, BumpedValues};

/// Delta, gamma and theta need the nodes of the second step.
pub const MIN_GREEK_STEPS: usize = 2;

/// Greeks of `spec` on a tree with `steps` steps, bumping volatility and
/// rate by the default bump size.
pub fn greeks(spec: &OptionSpec, steps: usize) -> RiskResult<Greeks> {
    greeks_with(spec, steps, DEFAULT_BUMP_SIZE)
}

pub fn greeks_with(spec: &OptionSpec, steps: usize, bump: f64) -> RiskResult<Greeks> {
    let tree = build(spec, steps)?;
    let greeks = Greeks {
        delta: tree_delta(&tree)?,
        gamma: tree_gamma(&tree)?,
        vega: vega_with(spec, steps, bump)?,
        theta: tree_theta(&tree)?,
        rho: rho_with(spec, steps, bump)?,
    };
    debug!(
        "{} {} lattice greeks with {} steps: {:?}",
        spec.option_class, spec.right, steps, greeks
    );
    Ok(greeks)
}

/// Greeks on a tree of `config.lattice_steps` steps, bumping by
/// `config.bump_size`.
pub fn greeks_for(spec: &OptionSpec, config: &EngineConfig) -> RiskResult<Greeks> {
    config.validate()?;
    greeks_with(spec, config.lattice_steps, config.bump_size)
}

pub fn delta(spec: &OptionSpec, steps: usize) -> RiskResult<f64> {
    tree_delta(&build(spec, steps)?)
}

pub fn gamma(spec: &OptionSpec, steps: usize) -> RiskResult<f64> {
    tree_gamma(&build(spec, steps)?)
}

/// Change of value per year of calendar time, usually negative.
pub fn theta(spec: &OptionSpec, steps: usize) -> RiskResult<f64> {
    tree_theta(&build(spec, steps)?)
}

pub fn vega(spec: &OptionSpec, steps: usize) -> RiskResult<f64> {
    vega_with(spec, steps, DEFAULT_BUMP_SIZE)
}

/// The volatility must stay positive after bumping it down.
pub fn vega_with(spec: &OptionSpec, steps: usize, bump: f64) -> RiskResult<f64> {
    let bump = check_bump(bump)?;
    if spec.volatility - bump <= 0.0 {
        return Err(RiskError::InvalidBump { bump });
    }
    let bumped = BumpedValues::evaluate(spec.volatility, bump, |volatility| {
        binomial::price(&spec.with_volatility(volatility), steps)
    })?;
    Ok(bumped.slope())
}

pub fn rho(spec: &OptionSpec, steps: usize) -> RiskResult<f64> {
    rho_with(spec, steps, DEFAULT_BUMP_SIZE)
}

pub fn rho_with(spec: &OptionSpec, steps: usize, bump: f64) -> RiskResult<f64> {
    let bumped = BumpedValues::evaluate(spec.risk_free_rate, bump, |risk_free_rate| {
        let shifted = OptionSpec {
            risk_free_rate,
            ..*spec
        };
        binomial::price(&shifted, steps)
    })?;
    Ok(bumped.slope())
}

fn build(spec: &OptionSpec, steps: usize) -> RiskResult<BinomialTree> {
    if steps < MIN_GREEK_STEPS {
        return Err(RiskError::TooFewSteps {
            required: MIN_GREEK_STEPS,
            steps,
        });
    }
    Ok(BinomialTree::build(spec, steps)?)
}

/// Underlying price and option value at a node.
fn node(tree: &BinomialTree, down_moves: usize, step: usize) -> RiskResult<(f64, f64)> {
    match (
        tree.underlying_at(down_moves, step),
        tree.value_at(down_moves, step),
    ) {
        (Some(underlying), Some(value)) => Ok((underlying, value)),
        _ => Err(RiskError::TooFewSteps {
            required: MIN_GREEK_STEPS,
            steps: tree.parameters().steps,
        }),
    }
}

fn slope(upper: (f64, f64), lower: (f64, f64)) -> RiskResult<f64> {
    checked_ratio(upper.1 - lower.1, upper.0 - lower.0, None)
}

fn tree_delta(tree: &BinomialTree) -> RiskResult<f64> {
    slope(node(tree, 0, 1)?, node(tree, 1, 1)?)
}

fn tree_gamma(tree: &BinomialTree) -> RiskResult<f64> {
    let up_up = node(tree, 0, 2)?;
    let up_down = node(tree, 1, 2)?;
    let down_down = node(tree, 2, 2)?;
    let upper_delta = slope(up_up, up_down)?;
    let lower_delta = slope(up_down, down_down)?;
    checked_ratio(upper_delta - lower_delta, 0.5 * (up_up.0 - down_down.0), None)
}

/// The up-down node after two steps has the spot price again.
fn tree_theta(tree: &BinomialTree) -> RiskResult<f64> {
    let (_, later) = node(tree, 1, 2)?;
    let elapsed = 2.0 * tree.parameters().dt;
    checked_ratio(later - tree.root_value(), elapsed, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use pricing::analytic::BlackScholesMerton;
    use pricing::{OptionClass, OptionRight, PricingError};

    const TOLERANCE: f64 = 1e-9;

    fn at_the_money(right: OptionRight) -> OptionSpec {
        OptionSpec::new(right, 100.0, 100.0, 0.2, 1.0, 0.05)
    }

    #[test]
    fn two_step_tree() {
        let greeks = greeks(&at_the_money(OptionRight::Call), 2).unwrap();
        assert_approx_eq!(greeks.delta, 0.6222988763083335, TOLERANCE);
        assert_approx_eq!(greeks.gamma, 0.03488829750195233, TOLERANCE);
        assert_approx_eq!(greeks.theta, -9.540501338582956, TOLERANCE);
        assert_approx_eq!(greeks.vega, 33.23725601495582, 1e-7);
        assert_approx_eq!(greeks.rho, 52.6859684588695, 1e-7);
    }

    #[test]
    fn european_greeks_approach_the_closed_form() {
        for right in [OptionRight::Call, OptionRight::Put] {
            let spec = at_the_money(right);
            let lattice = greeks(&spec, 500).unwrap();
            let analytic = BlackScholesMerton::greeks(&spec).unwrap();

            assert_approx_eq!(lattice.delta, analytic.delta, 1e-3);
            assert_approx_eq!(lattice.gamma, analytic.gamma, 1e-4);
            assert_approx_eq!(lattice.vega, analytic.vega, 0.1);
            assert_approx_eq!(lattice.theta, analytic.theta, 0.05);
            assert_approx_eq!(lattice.rho, analytic.rho, 0.05);
        }
    }

    #[test]
    fn early_exercise_shifts_the_put_greeks() {
        let european = OptionSpec::new(OptionRight::Put, 100.0, 100.0, 0.3, 1.0, 0.05);
        let american = european.with_class(OptionClass::American);

        let eu = greeks(&european, 200).unwrap();
        let am = greeks(&american, 200).unwrap();
        assert!(am.delta < eu.delta);
        assert!(am.gamma > eu.gamma);
        assert!(am.rho > eu.rho);
        assert!(am.theta < eu.theta);
    }

    #[test]
    fn single_greeks_match_the_bundle() {
        let spec = at_the_money(OptionRight::Put).with_class(OptionClass::American);
        let all = greeks(&spec, 50).unwrap();
        assert_eq!(delta(&spec, 50).unwrap(), all.delta);
        assert_eq!(gamma(&spec, 50).unwrap(), all.gamma);
        assert_eq!(theta(&spec, 50).unwrap(), all.theta);
        assert_eq!(vega(&spec, 50).unwrap(), all.vega);
        assert_eq!(rho(&spec, 50).unwrap(), all.rho);
    }

    #[test]
    fn configured_steps_and_bump() {
        let spec = at_the_money(OptionRight::Put).with_class(OptionClass::American);
        let config = EngineConfig::default()
            .with_lattice_steps(60)
            .with_bump_size(0.005);

        let configured = greeks_for(&spec, &config).unwrap();
        assert_eq!(configured, greeks_with(&spec, 60, 0.005).unwrap());
        assert!(configured.vega != greeks_with(&spec, 60, DEFAULT_BUMP_SIZE).unwrap().vega);
        assert_eq!(
            greeks_for(&spec, &EngineConfig::default()).unwrap(),
            greeks(&spec, 10).unwrap()
        );

        assert!(matches!(
            greeks_for(&spec, &config.with_lattice_steps(0)),
            Err(RiskError::Pricing(PricingError::InvalidConfiguration { .. }))
        ));
        // the config accepts a single step, the greeks do not
        assert_eq!(
            greeks_for(&spec, &config.with_lattice_steps(1)).unwrap_err(),
            RiskError::TooFewSteps {
                required: 2,
                steps: 1
            }
        );
    }

    #[test]
    fn too_few_steps() {
        let spec = at_the_money(OptionRight::Call);
        assert_eq!(
            greeks(&spec, 1).unwrap_err(),
            RiskError::TooFewSteps {
                required: 2,
                steps: 1
            }
        );
        assert!(delta(&spec, 0).is_err());
    }

    #[test]
    fn invalid_bumps() {
        let spec = at_the_money(OptionRight::Call);
        assert_eq!(
            vega_with(&spec, 10, 0.2).unwrap_err(),
            RiskError::InvalidBump { bump: 0.2 }
        );
        assert!(rho_with(&spec, 10, 0.0).is_err());
        assert!(greeks_with(&spec, 10, f64::NAN).is_err());
    }

    #[test]
    fn pricing_errors_pass_through() {
        let spec = OptionSpec::new(OptionRight::Call, -1.0, 100.0, 0.2, 1.0, 0.05);
        assert!(matches!(
            greeks(&spec, 10).unwrap_err(),
            RiskError::Pricing(PricingError::InvalidField { field: "spot", .. })
        ));
    }
}
