use log::debug;
use ndarray::Array2;

use crate::common::models::{OptionClass, OptionSpec};
use crate::error::{PricingError, PricingResult};

/// Per step quantities of the Cox-Ross-Rubinstein tree.
/// https://en.wikipedia.org/wiki/Binomial_options_pricing_model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeParameters {
    pub steps: usize,
    /// length of one step in years
    pub dt: f64,
    /// up move factor `e^(sigma sqrt(dt))`
    pub up: f64,
    /// down move factor, exactly `1 / up`
    pub down: f64,
    /// one step growth of the money account `e^(r dt)`, the discount divisor
    pub growth: f64,
    /// risk neutral probability of an up move
    pub probability: f64,
}

impl LatticeParameters {
    /// Fails for `steps == 0` and whenever the risk neutral probability is
    /// not strictly inside (0, 1), which happens for extreme combinations of
    /// volatility, rates and step size.
    pub fn new(spec: &OptionSpec, steps: usize) -> PricingResult<Self> {
        if steps == 0 {
            return Err(PricingError::invalid_configuration("lattice steps", steps));
        }
        spec.validate()?;

        let dt = spec.time_to_maturity / steps as f64;
        let up = (spec.volatility * dt.sqrt()).exp();
        let down = 1.0 / up;
        let growth = (spec.risk_free_rate * dt).exp();
        // the underlying drifts at r - q, cash accrues at r
        let drift = ((spec.risk_free_rate - spec.dividend_yield) * dt).exp();
        let probability = (drift - down) / (up - down);

        if !(probability > 0.0 && probability < 1.0) {
            return Err(PricingError::instability(format!(
                "risk neutral probability {} outside (0, 1) for volatility {}, rate {} and {} steps",
                probability, spec.volatility, spec.risk_free_rate, steps
            )));
        }

        Ok(Self {
            steps,
            dt,
            up,
            down,
            growth,
            probability,
        })
    }
}

/// A recombining tree of underlying prices and option values.
///
/// Node `[[i, j]]` is reached after `j` steps with `i` down moves and `j - i`
/// up moves; only `i <= j` is populated.
#[derive(Debug, Clone)]
pub struct BinomialTree {
    params: LatticeParameters,
    underlying: Array2<f64>,
    values: Array2<f64>,
    early_exercise_nodes: usize,
}

impl BinomialTree {
    pub fn build(spec: &OptionSpec, steps: usize) -> PricingResult<Self> {
        let params = LatticeParameters::new(spec, steps)?;
        let underlying = underlying_tree(spec.spot, &params);
        let (values, early_exercise_nodes) = value_tree(spec, &params, &underlying);

        debug!(
            "{} {} lattice with {} steps: p = {}, {} early exercise nodes",
            spec.option_class, spec.right, steps, params.probability, early_exercise_nodes
        );

        Ok(Self {
            params,
            underlying,
            values,
            early_exercise_nodes,
        })
    }

    /// The option value today.
    pub fn root_value(&self) -> f64 {
        self.values[[0, 0]]
    }

    pub fn parameters(&self) -> &LatticeParameters {
        &self.params
    }

    pub fn underlying_at(&self, down_moves: usize, step: usize) -> Option<f64> {
        self.node(&self.underlying, down_moves, step)
    }

    pub fn value_at(&self, down_moves: usize, step: usize) -> Option<f64> {
        self.node(&self.values, down_moves, step)
    }

    /// Interior nodes where exercising beats holding on; always 0 for a
    /// European option.
    pub fn early_exercise_nodes(&self) -> usize {
        self.early_exercise_nodes
    }

    fn node(&self, grid: &Array2<f64>, down_moves: usize, step: usize) -> Option<f64> {
        (down_moves <= step && step <= self.params.steps).then(|| grid[[down_moves, step]])
    }
}

fn underlying_tree(spot: f64, params: &LatticeParameters) -> Array2<f64> {
    let steps = params.steps;
    let mut tree = Array2::<f64>::zeros((steps + 1, steps + 1));
    tree[[0, 0]] = spot;

    for j in 1..=steps {
        tree[[j, j]] = tree[[j - 1, j - 1]] * params.down;
        for i in 0..j {
            tree[[i, j]] = tree[[i, j - 1]] * params.up;
        }
    }
    tree
}

/// Backward induction from the terminal payoff. American options compare the
/// continuation value with immediate exercise at every node.
fn value_tree(
    spec: &OptionSpec,
    params: &LatticeParameters,
    underlying: &Array2<f64>,
) -> (Array2<f64>, usize) {
    let steps = params.steps;
    let p = params.probability;
    let mut values = Array2::<f64>::zeros((steps + 1, steps + 1));
    let mut early_exercise_nodes = 0;

    for i in 0..=steps {
        values[[i, steps]] = spec.right.intrinsic_value(underlying[[i, steps]], spec.strike);
    }

    for j in (0..steps).rev() {
        for i in 0..=j {
            let continuation =
                (p * values[[i, j + 1]] + (1.0 - p) * values[[i + 1, j + 1]]) / params.growth;
            values[[i, j]] = match spec.option_class {
                OptionClass::European => continuation,
                OptionClass::American => {
                    let exercise = spec.right.intrinsic_value(underlying[[i, j]], spec.strike);
                    if exercise > continuation {
                        early_exercise_nodes += 1;
                        exercise
                    } else {
                        continuation
                    }
                }
            };
        }
    }
    (values, early_exercise_nodes)
}

/// Cox-Ross-Rubinstein price of a European or American option.
pub fn price(spec: &OptionSpec, steps: usize) -> PricingResult<f64> {
    BinomialTree::build(spec, steps).map(|tree| tree.root_value())
}
