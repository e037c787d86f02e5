use thiserror::Error;

pub type PricingResult<T> = Result<T, PricingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A required field of a spec was never set.
    #[error("{field} is not set, please set it before recalculating")]
    MissingField { field: &'static str },

    #[error("invalid {field} = {value}: {reason}")]
    InvalidField {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// An unknown name or an out-of-domain parameter, e.g. `steps = 0`.
    #[error("invalid {name}: {value}")]
    InvalidConfiguration { name: &'static str, value: String },

    #[error("unsupported configuration: {reason}")]
    UnsupportedConfiguration { reason: String },

    #[error("invalid numerical configuration: {reason}")]
    NumericalInstability { reason: String },

    #[error("price {price} outside the achievable range ({min}, {max})")]
    PriceOutOfRange { price: f64, min: f64, max: f64 },

    #[error("no solution found after {iterations} iterations (last iterate {last})")]
    NoConvergence { iterations: u32, last: f64 },
}

impl PricingError {
    pub(crate) fn invalid_field(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value,
            reason,
        }
    }

    pub(crate) fn invalid_configuration(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidConfiguration {
            name,
            value: value.to_string(),
        }
    }

    pub(crate) fn instability(reason: impl Into<String>) -> Self {
        Self::NumericalInstability {
            reason: reason.into(),
        }
    }
}

/// Positive and finite, the common requirement on prices, strikes and times.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> PricingResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PricingError::invalid_field(field, value, "must be positive"))
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> PricingResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::invalid_field(field, value, "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = PricingError::MissingField { field: "maturity" };
        assert!(err.to_string().starts_with("maturity is not set"));

        let err = PricingError::invalid_field("face_value", -1.0, "must be positive");
        assert_eq!(err.to_string(), "invalid face_value = -1: must be positive");

        let err = PricingError::invalid_configuration("pricing method", "monte-carlo");
        assert_eq!(err.to_string(), "invalid pricing method: monte-carlo");
    }

    #[test]
    fn positivity_checks() {
        assert_eq!(ensure_positive("strike", 10.0), Ok(10.0));
        assert!(ensure_positive("strike", 0.0).is_err());
        assert!(ensure_positive("strike", f64::NAN).is_err());
        assert!(ensure_positive("strike", f64::INFINITY).is_err());
        assert_eq!(ensure_finite("rate", -0.01), Ok(-0.01));
        assert!(ensure_finite("rate", f64::NEG_INFINITY).is_err());
    }
}
