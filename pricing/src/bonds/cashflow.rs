use crate::common::models::BondSpec;
use crate::error::{ensure_positive, PricingError, PricingResult};

/// Periods closer than this to a whole number are taken as whole.
const PERIOD_ROUNDING: f64 = 1e-9;

/// Validated terms of a fixed coupon bond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondTerms {
    pub face_value: f64,
    /// percent per annum
    pub coupon_rate: f64,
    pub coupon_frequency: u32,
    pub maturity: f64,
    /// number of coupon periods until maturity, at least one
    pub periods: u32,
}

impl BondTerms {
    /// Reports the first missing or invalid field, checking maturity, coupon
    /// frequency, coupon rate and face value in that order.
    pub fn from_spec(spec: &BondSpec) -> PricingResult<Self> {
        let maturity = spec
            .maturity
            .ok_or(PricingError::MissingField { field: "maturity" })?;
        let coupon_frequency = spec.coupon_frequency.ok_or(PricingError::MissingField {
            field: "coupon_frequency",
        })?;
        let coupon_rate = spec
            .coupon_rate
            .ok_or(PricingError::MissingField { field: "coupon_rate" })?;
        let face_value = spec
            .face_value
            .ok_or(PricingError::MissingField { field: "face_value" })?;

        ensure_positive("maturity", maturity)?;
        if coupon_frequency == 0 {
            return Err(PricingError::invalid_field(
                "coupon_frequency",
                0.0,
                "must be positive",
            ));
        }
        if !(coupon_rate.is_finite() && coupon_rate >= 0.0) {
            return Err(PricingError::invalid_field(
                "coupon_rate",
                coupon_rate,
                "must be non-negative",
            ));
        }
        ensure_positive("face_value", face_value)?;

        let exact_periods = maturity * coupon_frequency as f64;
        let periods = exact_periods.round();
        if (exact_periods - periods).abs() > PERIOD_ROUNDING {
            return Err(PricingError::invalid_field(
                "maturity",
                maturity,
                "must span a whole number of coupon periods",
            ));
        }
        if periods < 1.0 {
            return Err(PricingError::invalid_field(
                "maturity",
                maturity,
                "must span at least one coupon period",
            ));
        }
        // periods are discounting exponents in `powi`
        if periods > i32::MAX as f64 {
            return Err(PricingError::invalid_field(
                "maturity",
                maturity,
                "spans too many coupon periods",
            ));
        }

        Ok(Self {
            face_value,
            coupon_rate,
            coupon_frequency,
            maturity,
            periods: periods as u32,
        })
    }

    /// Coupon paid each period.
    pub fn coupon(&self) -> f64 {
        self.coupon_rate / 100.0 * self.face_value / self.coupon_frequency as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cashflow {
    /// 1-based coupon period
    pub period: u32,
    /// time of payment in years
    pub time: f64,
    pub amount: f64,
}

/// The coupon dates of a bond, the last one also paying back the face value.
#[derive(Debug, Clone, PartialEq)]
pub struct CashflowSchedule {
    terms: BondTerms,
    cashflows: Vec<Cashflow>,
}

impl CashflowSchedule {
    pub fn from_spec(spec: &BondSpec) -> PricingResult<Self> {
        BondTerms::from_spec(spec).map(Self::from_terms)
    }

    pub fn from_terms(terms: BondTerms) -> Self {
        let coupon = terms.coupon();
        let frequency = terms.coupon_frequency as f64;
        let cashflows = (1..=terms.periods)
            .map(|period| {
                let redemption = if period == terms.periods {
                    terms.face_value
                } else {
                    0.0
                };
                Cashflow {
                    period,
                    time: period as f64 / frequency,
                    amount: coupon + redemption,
                }
            })
            .collect();
        Self { terms, cashflows }
    }

    pub fn terms(&self) -> &BondTerms {
        &self.terms
    }

    pub fn cashflows(&self) -> &[Cashflow] {
        &self.cashflows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cashflow> {
        self.cashflows.iter()
    }

    pub fn len(&self) -> usize {
        self.cashflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cashflows.is_empty()
    }

    /// Sum of all payments, the bond's value at a zero yield.
    pub fn total_amount(&self) -> f64 {
        self.cashflows.iter().map(|cf| cf.amount).sum()
    }

    /// Present value with the yield compounded once per coupon period.
    pub fn present_value(&self, yield_rate: f64) -> f64 {
        let period_rate = 1.0 + yield_rate / self.terms.coupon_frequency as f64;
        self.cashflows
            .iter()
            .map(|cf| cf.amount / period_rate.powi(cf.period as i32))
            .sum()
    }
}
