//! Single entry point for option prices, choosing between the closed form
//! and the lattice.
//!
//! | exercise | method   | pricer |
//! |----------|----------|--------|
//! | European | Analytic | Black-Scholes-Merton |
//! | European | Lattice  | CRR binomial tree |
//! | American | Lattice  | CRR binomial tree with early exercise |
//! | American | Analytic | unsupported |

use log::{debug, warn};

use crate::analytic::black_scholes::IMPLIED_VOL_INITIAL_GUESS;
use crate::analytic::BlackScholesMerton;
use crate::common::models::{OptionClass, OptionRight, OptionSpec, PricingMethod};
use crate::config::EngineConfig;
use crate::error::{PricingError, PricingResult};
use crate::lattice::binomial;
use crate::solvers::{newton_raphson_numerical, RootFindResult};

/// Prices `spec` with exercise `style`, which takes precedence over
/// `spec.option_class`.
pub fn price(
    spec: &OptionSpec,
    style: OptionClass,
    method: PricingMethod,
    steps: usize,
) -> PricingResult<f64> {
    let spec = spec.with_class(style);
    match (style, method) {
        (OptionClass::European, PricingMethod::Analytic) => BlackScholesMerton::price(&spec),
        (_, PricingMethod::Lattice) => binomial::price(&spec, steps),
        (OptionClass::American, PricingMethod::Analytic) => {
            Err(PricingError::UnsupportedConfiguration {
                reason: "american options have no closed form, use the lattice method".into(),
            })
        }
    }
}

/// Like [`price`] with the exercise style and method given by name, e.g.
/// `"american"` and `"binomial"`.
pub fn price_by_name(
    spec: &OptionSpec,
    style: &str,
    method: &str,
    steps: usize,
) -> PricingResult<f64> {
    price(spec, style.parse()?, method.parse()?, steps)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OptionPricer {
    config: EngineConfig,
}

impl OptionPricer {
    pub fn new(config: EngineConfig) -> PricingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Prices `spec` with its own exercise style.
    pub fn price(&self, spec: &OptionSpec, method: PricingMethod) -> PricingResult<f64> {
        price(spec, spec.option_class, method, self.config.lattice_steps)
    }

    /// The volatility at which `method` reproduces `target_price`.
    ///
    /// The analytic method drives Newton-Raphson with vega; the lattice has no
    /// closed form derivative, so its search differentiates numerically.
    pub fn implied_volatility(
        &self,
        spec: &OptionSpec,
        target_price: f64,
        method: PricingMethod,
    ) -> PricingResult<RootFindResult> {
        match method {
            PricingMethod::Analytic => BlackScholesMerton::implied_volatility_with(
                spec,
                target_price,
                IMPLIED_VOL_INITIAL_GUESS,
                &self.config.solver,
            ),
            PricingMethod::Lattice => self.lattice_implied_volatility(spec, target_price),
        }
    }

    fn lattice_implied_volatility(
        &self,
        spec: &OptionSpec,
        target_price: f64,
    ) -> PricingResult<RootFindResult> {
        spec.validate()?;
        let (min, max) = lattice_price_bounds(spec);
        if !(target_price > min && target_price < max) {
            return Err(PricingError::PriceOutOfRange {
                price: target_price,
                min,
                max,
            });
        }

        let steps = self.config.lattice_steps;
        // volatilities the lattice cannot represent give NaN, ending the search
        let residual = |sigma: f64| {
            binomial::price(&spec.with_volatility(sigma), steps)
                .map(|value| value - target_price)
                .unwrap_or(f64::NAN)
        };
        let result = newton_raphson_numerical(
            residual,
            IMPLIED_VOL_INITIAL_GUESS,
            &self.config.solver,
        );
        if result.converged {
            debug!(
                "lattice implied volatility {} after {} iterations",
                result.value, result.iterations
            );
        } else {
            warn!(
                "no lattice implied volatility found for {} {} price {}",
                spec.option_class, spec.right, target_price
            );
        }
        Ok(result)
    }
}

/// Lower bound is the value at zero volatility in the limit, upper bound the
/// value at infinite volatility.
fn lattice_price_bounds(spec: &OptionSpec) -> (f64, f64) {
    match spec.option_class {
        OptionClass::European => BlackScholesMerton::price_bounds(spec),
        OptionClass::American => {
            let upper = match spec.right {
                OptionRight::Call => spec.spot,
                OptionRight::Put => spec.strike,
            };
            (spec.right.intrinsic_value(spec.spot, spec.strike), upper)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::SolverConfig;
    use assert_approx_eq::assert_approx_eq;

    fn long_dated(right: OptionRight) -> OptionSpec {
        OptionSpec::new(right, 16.0, 10.0, 0.16, 60.0, 0.02)
    }

    #[test]
    fn dispatch_table() {
        let call = long_dated(OptionRight::Call);
        let put = long_dated(OptionRight::Put);

        let bsm = price(&call, OptionClass::European, PricingMethod::Analytic, 10).unwrap();
        assert_approx_eq!(bsm, 13.29762576988012, 1e-8);

        let binomial = price(&call, OptionClass::European, PricingMethod::Lattice, 10).unwrap();
        assert_approx_eq!(binomial, 13.300074416857715, 1e-9);
        assert!((bsm - binomial).abs() < 0.01);

        let european_put = price(&put, OptionClass::European, PricingMethod::Lattice, 10).unwrap();
        assert_approx_eq!(european_put, 0.3120165359797314, 1e-9);

        let american_put = price(&put, OptionClass::American, PricingMethod::Lattice, 10).unwrap();
        assert!(american_put >= european_put);

        assert!(matches!(
            price(&put, OptionClass::American, PricingMethod::Analytic, 10),
            Err(PricingError::UnsupportedConfiguration { .. })
        ));
    }

    #[test]
    fn style_overrides_the_spec() {
        let spec = long_dated(OptionRight::Put).with_class(OptionClass::American);
        let european = price(&spec, OptionClass::European, PricingMethod::Analytic, 10).unwrap();
        assert_approx_eq!(european, 0.3095678890021424, 1e-8);
    }

    #[test]
    fn by_name() {
        let spec = long_dated(OptionRight::Call);
        let value = price_by_name(&spec, "e", "binomial", 10).unwrap();
        assert_approx_eq!(value, 13.300074416857715, 1e-9);

        assert_eq!(
            price_by_name(&spec, "bermudan", "binomial", 10).unwrap_err(),
            PricingError::InvalidConfiguration {
                name: "exercise style",
                value: "bermudan".into()
            }
        );
        assert_eq!(
            price_by_name(&spec, "european", "monte-carlo", 10).unwrap_err(),
            PricingError::InvalidConfiguration {
                name: "pricing method",
                value: "monte-carlo".into()
            }
        );
    }

    #[test]
    fn pricer_uses_configured_steps() {
        let spec = OptionSpec::new(OptionRight::Call, 100.0, 100.0, 0.2, 1.0, 0.05);
        let coarse = OptionPricer::default();
        let fine = OptionPricer::new(EngineConfig::default().with_lattice_steps(500)).unwrap();

        assert_eq!(coarse.config().lattice_steps, crate::config::DEFAULT_LATTICE_STEPS);
        let analytic = coarse.price(&spec, PricingMethod::Analytic).unwrap();
        let coarse_error = (coarse.price(&spec, PricingMethod::Lattice).unwrap() - analytic).abs();
        let fine_error = (fine.price(&spec, PricingMethod::Lattice).unwrap() - analytic).abs();
        assert!(fine_error < coarse_error);

        assert!(OptionPricer::new(EngineConfig::default().with_lattice_steps(0)).is_err());
    }

    #[test]
    fn analytic_implied_volatility() {
        let pricer = OptionPricer::new(
            EngineConfig::default().with_solver(SolverConfig::default().with_tolerance(1e-10)),
        )
        .unwrap();
        let spec = OptionSpec::new(OptionRight::Put, 100.0, 95.0, 0.35, 0.75, 0.03);
        let target = BlackScholesMerton::price(&spec).unwrap();
        let result = pricer
            .implied_volatility(&spec, target, PricingMethod::Analytic)
            .unwrap();
        assert!(result.converged);
        assert_approx_eq!(result.value, 0.35, 1e-6);
    }

    #[test]
    fn lattice_implied_volatility_of_an_american_put() {
        let pricer = OptionPricer::new(EngineConfig::default().with_lattice_steps(100)).unwrap();
        let spec = OptionSpec::new(OptionRight::Put, 100.0, 100.0, 0.3, 1.0, 0.05)
            .with_class(OptionClass::American);
        let target = pricer.price(&spec, PricingMethod::Lattice).unwrap();

        let result = pricer
            .implied_volatility(&spec, target, PricingMethod::Lattice)
            .unwrap();
        assert!(result.converged);
        assert_approx_eq!(result.value, 0.3, 1e-4);
    }

    #[test]
    fn lattice_implied_volatility_out_of_range() {
        let pricer = OptionPricer::default();
        let spec = OptionSpec::new(OptionRight::Put, 80.0, 100.0, 0.3, 1.0, 0.05)
            .with_class(OptionClass::American);
        // below intrinsic
        assert!(matches!(
            pricer.implied_volatility(&spec, 15.0, PricingMethod::Lattice),
            Err(PricingError::PriceOutOfRange { .. })
        ));
    }
}
