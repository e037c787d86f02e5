use log::{debug, warn};

use super::cashflow::CashflowSchedule;
use crate::common::models::BondSpec;
use crate::error::{ensure_finite, ensure_positive, PricingError, PricingResult};
use crate::solvers::{newton_raphson_numerical, RootFindResult, SolverConfig};

/// Starting yield of the yield to maturity search.
pub const YTM_INITIAL_GUESS: f64 = 0.05;

/// Price of the bond at a decimal yield compounded once per coupon period.
///
/// A cash flow at `t` years is discounted by `(1 + y / f)^(f t)` with `f` the
/// coupon frequency.
pub fn price(spec: &BondSpec, yield_rate: f64) -> PricingResult<f64> {
    let schedule = CashflowSchedule::from_spec(spec)?;
    price_schedule(&schedule, yield_rate)
}

fn price_schedule(schedule: &CashflowSchedule, yield_rate: f64) -> PricingResult<f64> {
    ensure_finite("yield", yield_rate)?;
    let frequency = schedule.terms().coupon_frequency as f64;
    if yield_rate <= -frequency {
        return Err(PricingError::invalid_field(
            "yield",
            yield_rate,
            "per period discount rate must stay above -100%",
        ));
    }
    Ok(schedule.present_value(yield_rate))
}

/// The yield reproducing `spec.price`, from an initial guess of 5% with the
/// default solver settings.
pub fn yield_to_maturity(spec: &BondSpec) -> PricingResult<RootFindResult> {
    yield_to_maturity_with(spec, YTM_INITIAL_GUESS, &SolverConfig::default())
}

/// Newton-Raphson on `price(y) - spec.price` with a numerical derivative.
///
/// The price must be positive and no larger than the sum of all cash flows
/// (the value at a zero yield); anything else has no non-negative yield and
/// is reported before the search starts.
pub fn yield_to_maturity_with(
    spec: &BondSpec,
    initial_guess: f64,
    config: &SolverConfig,
) -> PricingResult<RootFindResult> {
    let schedule = CashflowSchedule::from_spec(spec)?;
    let target = spec
        .price
        .ok_or(PricingError::MissingField { field: "price" })?;
    ensure_positive("price", target)?;

    let max = schedule.total_amount();
    if target > max {
        return Err(PricingError::PriceOutOfRange {
            price: target,
            min: 0.0,
            max,
        });
    }

    let frequency = schedule.terms().coupon_frequency as f64;
    let residual = |y: f64| {
        if y <= -frequency {
            return f64::NAN;
        }
        schedule.present_value(y) - target
    };
    let result = newton_raphson_numerical(residual, initial_guess, config);
    if result.converged {
        debug!(
            "{}: yield to maturity {} after {} iterations",
            spec, result.value, result.iterations
        );
    } else {
        warn!("{}: no yield to maturity found for price {}", spec, target);
    }
    Ok(result)
}

impl BondSpec {
    /// The known yield, or the one solved from the known price.
    pub fn resolve_yield(&self) -> PricingResult<f64> {
        if let Some(known) = self.yield_to_maturity {
            return ensure_finite("yield_to_maturity", known);
        }
        let result = yield_to_maturity(self)?;
        result.root().ok_or(PricingError::NoConvergence {
            iterations: result.iterations,
            last: result.value,
        })
    }

    /// The known price, or the one implied by the known yield.
    pub fn resolve_price(&self) -> PricingResult<f64> {
        if let Some(known) = self.price {
            return ensure_positive("price", known);
        }
        let known = self
            .yield_to_maturity
            .ok_or(PricingError::MissingField { field: "price" })?;
        price(self, known)
    }
}
