use log::{debug, warn};
use probability::distribution::{Continuous, Distribution, Gaussian};

use crate::common::models::{OptionClass, OptionRight, OptionSpec};
use crate::error::{PricingError, PricingResult};
use crate::solvers::{newton_raphson, RootFindResult, SolverConfig};

/// Starting volatility of the implied volatility search.
pub const IMPLIED_VOL_INITIAL_GUESS: f64 = 0.25;

pub(crate) fn cdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.distribution(d)
}

pub(crate) fn pdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.density(d)
}

pub trait OptionPrice {
    type Params;
    fn put(params: &Self::Params) -> PricingResult<f64>;
    fn call(params: &Self::Params) -> PricingResult<f64>;
}

/// Value of a greek for the call and for the put written on the same terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreekPair {
    pub call: f64,
    pub put: f64,
}

impl GreekPair {
    pub fn for_right(&self, right: OptionRight) -> f64 {
        match right {
            OptionRight::Call => self.call,
            OptionRight::Put => self.put,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

/// d1 and d2 of the Black-Scholes-Merton formula, together with the pieces
/// every price and greek needs.
#[derive(Debug, Clone, Copy)]
struct Terms {
    d1: f64,
    d2: f64,
    sqrt_t: f64,
    discount: f64,
    dividend_discount: f64,
}

impl Terms {
    fn new(spec: &OptionSpec) -> PricingResult<Self> {
        Self::check(spec)?;
        if spec.volatility == 0.0 {
            return Err(PricingError::instability(
                "zero volatility makes d1 a division by zero",
            ));
        }
        Ok(Self::unchecked(spec, spec.volatility))
    }

    /// Inputs the closed form can take at all, whatever the volatility.
    fn check(spec: &OptionSpec) -> PricingResult<()> {
        if spec.option_class == OptionClass::American {
            return Err(PricingError::UnsupportedConfiguration {
                reason: "no closed form for american options, use the lattice pricer".into(),
            });
        }
        if spec.time_to_maturity == 0.0 {
            return Err(PricingError::instability(
                "zero time to maturity makes d1 a division by zero",
            ));
        }
        spec.validate()
    }

    /// No validation; used inside the implied volatility search where the
    /// solver may probe any volatility.
    fn unchecked(spec: &OptionSpec, volatility: f64) -> Self {
        let sqrt_t = spec.time_to_maturity.sqrt();
        let sigma_exp = volatility * sqrt_t;
        let d1 = ((spec.spot / spec.strike).ln()
            + (spec.risk_free_rate - spec.dividend_yield + volatility.powi(2) / 2.0)
                * spec.time_to_maturity)
            / sigma_exp;
        let d2 = d1 - sigma_exp;
        Self {
            d1,
            d2,
            sqrt_t,
            discount: spec.discount_factor(),
            dividend_discount: spec.dividend_discount_factor(),
        }
    }

    fn call(&self, spec: &OptionSpec) -> f64 {
        spec.spot * self.dividend_discount * cdf(self.d1)
            - spec.strike * self.discount * cdf(self.d2)
    }

    fn put(&self, spec: &OptionSpec) -> f64 {
        spec.strike * self.discount * cdf(-self.d2)
            - spec.spot * self.dividend_discount * cdf(-self.d1)
    }

    fn price(&self, spec: &OptionSpec) -> f64 {
        match spec.right {
            OptionRight::Call => self.call(spec),
            OptionRight::Put => self.put(spec),
        }
    }

    fn vega(&self, spec: &OptionSpec) -> f64 {
        spec.spot * pdf(self.d1) * self.sqrt_t
    }
}

/// European put and call prices and greeks for stocks with a continuous
/// dividend yield.
/// https://en.wikipedia.org/wiki/Black-Scholes_model
pub struct BlackScholesMerton;

impl OptionPrice for BlackScholesMerton {
    type Params = OptionSpec;

    fn call(spec: &OptionSpec) -> PricingResult<f64> {
        Terms::new(spec).map(|terms| terms.call(spec))
    }

    fn put(spec: &OptionSpec) -> PricingResult<f64> {
        Terms::new(spec).map(|terms| terms.put(spec))
    }
}

impl BlackScholesMerton {
    /// Price of the option for `spec.right`.
    pub fn price(spec: &OptionSpec) -> PricingResult<f64> {
        Terms::new(spec).map(|terms| terms.price(spec))
    }

    pub fn delta(spec: &OptionSpec) -> PricingResult<GreekPair> {
        let terms = Terms::new(spec)?;
        let call = cdf(terms.d1);
        Ok(GreekPair {
            call,
            put: call - 1.0,
        })
    }

    pub fn gamma(spec: &OptionSpec) -> PricingResult<GreekPair> {
        let terms = Terms::new(spec)?;
        let gamma = pdf(terms.d1) / (spec.spot * spec.volatility * terms.sqrt_t);
        Ok(GreekPair {
            call: gamma,
            put: gamma,
        })
    }

    pub fn vega(spec: &OptionSpec) -> PricingResult<GreekPair> {
        let terms = Terms::new(spec)?;
        let vega = terms.vega(spec);
        Ok(GreekPair {
            call: vega,
            put: vega,
        })
    }

    pub fn theta(spec: &OptionSpec) -> PricingResult<GreekPair> {
        let terms = Terms::new(spec)?;
        let decay = -spec.spot * pdf(terms.d1) * spec.volatility / (2.0 * terms.sqrt_t);
        let carry = spec.risk_free_rate * spec.strike * terms.discount;
        Ok(GreekPair {
            call: decay - carry * cdf(terms.d2),
            put: decay + carry * cdf(-terms.d2),
        })
    }

    pub fn rho(spec: &OptionSpec) -> PricingResult<GreekPair> {
        let terms = Terms::new(spec)?;
        let scale = spec.strike * spec.time_to_maturity * terms.discount;
        Ok(GreekPair {
            call: scale * cdf(terms.d2),
            put: -scale * cdf(-terms.d2),
        })
    }

    /// All five greeks for `spec.right`.
    pub fn greeks(spec: &OptionSpec) -> PricingResult<Greeks> {
        let right = spec.right;
        Ok(Greeks {
            delta: Self::delta(spec)?.for_right(right),
            gamma: Self::gamma(spec)?.for_right(right),
            vega: Self::vega(spec)?.for_right(right),
            theta: Self::theta(spec)?.for_right(right),
            rho: Self::rho(spec)?.for_right(right),
        })
    }

    /// No-arbitrage band an option price has to lie in for a volatility to exist.
    pub fn price_bounds(spec: &OptionSpec) -> (f64, f64) {
        let forward_spot = spec.spot * spec.dividend_discount_factor();
        let discounted_strike = spec.strike * spec.discount_factor();
        match spec.right {
            OptionRight::Call => ((forward_spot - discounted_strike).max(0.0), forward_spot),
            OptionRight::Put => ((discounted_strike - forward_spot).max(0.0), discounted_strike),
        }
    }

    /// The volatility reproducing `target_price`, starting from a volatility of
    /// 0.25 with the default solver settings.
    pub fn implied_volatility(spec: &OptionSpec, target_price: f64) -> PricingResult<RootFindResult> {
        Self::implied_volatility_with(
            spec,
            target_price,
            IMPLIED_VOL_INITIAL_GUESS,
            &SolverConfig::default(),
        )
    }

    /// Newton-Raphson on `price(sigma) - target_price` with vega as derivative.
    ///
    /// A target outside the no-arbitrage band is rejected up front. Otherwise
    /// a search that does not converge is returned as such; callers report
    /// "no implied volatility found".
    pub fn implied_volatility_with(
        spec: &OptionSpec,
        target_price: f64,
        initial_guess: f64,
        config: &SolverConfig,
    ) -> PricingResult<RootFindResult> {
        Terms::check(spec)?;
        let (min, max) = Self::price_bounds(spec);
        if !(target_price > min && target_price < max) {
            return Err(PricingError::PriceOutOfRange {
                price: target_price,
                min,
                max,
            });
        }

        // The solver may wander to non-positive volatilities; the formula then
        // yields NaN or a poor fit and the search ends unconverged.
        let residual = |sigma: f64| Terms::unchecked(spec, sigma).price(spec) - target_price;
        let vega = |sigma: f64| Terms::unchecked(spec, sigma).vega(spec);

        let result = newton_raphson(residual, vega, initial_guess, config);
        if result.converged {
            debug!(
                "implied volatility {} found after {} iterations",
                result.value, result.iterations
            );
        } else {
            warn!(
                "no implied volatility found for {} price {}",
                spec.right, target_price
            );
        }
        Ok(result)
    }
}
