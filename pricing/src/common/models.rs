use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_positive, PricingError, PricingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    /// +1 for a call, -1 for a put: the payoff is `max(sign * (S - K), 0)`.
    pub fn sign(&self) -> f64 {
        match self {
            OptionRight::Call => 1.0,
            OptionRight::Put => -1.0,
        }
    }

    pub fn intrinsic_value(&self, underlying: f64, strike: f64) -> f64 {
        (self.sign() * (underlying - strike)).max(0.0)
    }
}

impl FromStr for OptionRight {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "call" => Ok(OptionRight::Call),
            "p" | "put" => Ok(OptionRight::Put),
            _ => Err(PricingError::invalid_configuration("option right", s)),
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionRight::Call => write!(f, "call"),
            OptionRight::Put => write!(f, "put"),
        }
    }
}

/// Exercise style of the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionClass {
    #[default]
    European,
    American,
}

impl FromStr for OptionClass {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e" | "eu" | "euro" | "european" => Ok(OptionClass::European),
            "a" | "am" | "amer" | "american" => Ok(OptionClass::American),
            _ => Err(PricingError::invalid_configuration("exercise style", s)),
        }
    }
}

impl fmt::Display for OptionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionClass::European => write!(f, "european"),
            OptionClass::American => write!(f, "american"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PricingMethod {
    /// Closed form Black-Scholes-Merton.
    #[default]
    Analytic,
    /// Cox-Ross-Rubinstein binomial lattice.
    Lattice,
}

impl FromStr for PricingMethod {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bsm" | "black" | "analytic" => Ok(PricingMethod::Analytic),
            "binomial" | "lattice" | "crr" => Ok(PricingMethod::Lattice),
            _ => Err(PricingError::invalid_configuration("pricing method", s)),
        }
    }
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMethod::Analytic => write!(f, "analytic"),
            PricingMethod::Lattice => write!(f, "lattice"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionSpec {
    pub option_class: OptionClass,
    pub right: OptionRight,
    /// the underlying's price today
    pub spot: f64,
    /// the strike or exercise price
    pub strike: f64,
    /// the annualized standard deviation of the underlying's returns
    pub volatility: f64,
    /// time to expiration in years
    pub time_to_maturity: f64,
    /// the annualized, continuously compounded risk-free rate
    pub risk_free_rate: f64,
    /// continuous dividend yield
    #[cfg_attr(feature = "serde", serde(default))]
    pub dividend_yield: f64,
}

impl OptionSpec {
    /// A European option without dividends.
    pub fn new(
        right: OptionRight,
        spot: f64,
        strike: f64,
        volatility: f64,
        time_to_maturity: f64,
        risk_free_rate: f64,
    ) -> Self {
        Self {
            option_class: OptionClass::European,
            right,
            spot,
            strike,
            volatility,
            time_to_maturity,
            risk_free_rate,
            dividend_yield: 0.0,
        }
    }

    pub fn with_class(self, option_class: OptionClass) -> Self {
        Self {
            option_class,
            ..self
        }
    }

    pub fn with_right(self, right: OptionRight) -> Self {
        Self { right, ..self }
    }

    pub fn with_dividend_yield(self, dividend_yield: f64) -> Self {
        Self {
            dividend_yield,
            ..self
        }
    }

    pub fn with_volatility(self, volatility: f64) -> Self {
        Self { volatility, ..self }
    }

    /// Checks the contract terms and market inputs shared by every pricer.
    pub fn validate(&self) -> PricingResult<()> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("strike", self.strike)?;
        ensure_positive("time_to_maturity", self.time_to_maturity)?;
        ensure_finite("risk_free_rate", self.risk_free_rate)?;
        ensure_finite("dividend_yield", self.dividend_yield)?;
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(PricingError::invalid_field(
                "volatility",
                self.volatility,
                "must be non-negative",
            ));
        }
        Ok(())
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }

    pub fn dividend_discount_factor(&self) -> f64 {
        (-self.dividend_yield * self.time_to_maturity).exp()
    }
}

/// Fixed coupon bond terms.
///
/// Every field is optional so that an incompletely specified bond can be
/// represented; the pricing routines report the first missing field. Either
/// `price` or `yield_to_maturity` is the known side of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BondSpec {
    pub face_value: Option<f64>,
    /// coupon in percent per annum, e.g. 6.25
    pub coupon_rate: Option<f64>,
    /// coupon payments per year
    pub coupon_frequency: Option<u32>,
    /// years to maturity
    pub maturity: Option<f64>,
    pub price: Option<f64>,
    /// decimal yield, e.g. 0.05 for 5%
    pub yield_to_maturity: Option<f64>,
}

impl BondSpec {
    pub fn new(face_value: f64, coupon_rate: f64, coupon_frequency: u32, maturity: f64) -> Self {
        Self {
            face_value: Some(face_value),
            coupon_rate: Some(coupon_rate),
            coupon_frequency: Some(coupon_frequency),
            maturity: Some(maturity),
            price: None,
            yield_to_maturity: None,
        }
    }

    pub fn with_price(self, price: f64) -> Self {
        Self {
            price: Some(price),
            ..self
        }
    }

    pub fn with_yield(self, yield_to_maturity: f64) -> Self {
        Self {
            yield_to_maturity: Some(yield_to_maturity),
            ..self
        }
    }
}

impl fmt::Display for BondSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bond(face_value={:?}, coupon_rate={:?}, coupon_frequency={:?}, maturity={:?})",
            self.face_value, self.coupon_rate, self.coupon_frequency, self.maturity
        )
    }
}
