//! Custom prompt validators.
//!
//! A validator sees the raw recognition result and accepts or rejects it.
//! Rejection makes the prompt retry.

use std::fmt;

use crate::domain::foundation::ValidationError;

use super::recognizer::RecognitionResult;

/// Pluggable accept/reject check run after recognition.
pub trait PromptValidator: Send + Sync + fmt::Debug {
    fn validate(&self, recognized: &RecognitionResult) -> bool;
}

/// Accepts numbers in a closed interval, optionally restricted to
/// multiples of a step (a step of 0.5 allows whole and half sizes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValidator {
    min: f64,
    max: f64,
    step: Option<f64>,
}

impl RangeValidator {
    /// # Errors
    ///
    /// Returns `InvalidFormat` if `min > max` or either bound is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ValidationError::invalid_format(
                "range",
                format!("invalid bounds [{}, {}]", min, max),
            ));
        }
        Ok(Self {
            min,
            max,
            step: None,
        })
    }

    /// # Errors
    ///
    /// Returns `InvalidFormat` if the step is not a positive finite number.
    pub fn with_step(mut self, step: f64) -> Result<Self, ValidationError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ValidationError::invalid_format(
                "step",
                "must be a positive number",
            ));
        }
        self.step = Some(step);
        Ok(self)
    }

    /// Shoe sizes from 0 to 16 in half steps.
    pub fn shoe_size() -> Self {
        Self {
            min: 0.0,
            max: 16.0,
            step: Some(0.5),
        }
    }

    pub fn accepts(&self, value: f64) -> bool {
        if !(self.min..=self.max).contains(&value) {
            return false;
        }
        match self.step {
            Some(step) => (value / step).fract() == 0.0,
            None => true,
        }
    }
}

impl PromptValidator for RangeValidator {
    fn validate(&self, recognized: &RecognitionResult) -> bool {
        recognized
            .value
            .as_ref()
            .and_then(|value| value.as_number())
            .is_some_and(|n| self.accepts(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::value::ScalarValue;

    fn number(n: f64) -> RecognitionResult {
        RecognitionResult {
            value: Some(ScalarValue::Number(n)),
        }
    }

    #[test]
    fn shoe_size_accepts_whole_and_half_sizes_in_range() {
        let validator = RangeValidator::shoe_size();
        for n in [0.0, 16.0, 8.5, 10.0] {
            assert!(validator.validate(&number(n)), "{} should be accepted", n);
        }
    }

    #[test]
    fn shoe_size_rejects_out_of_range_and_odd_fractions() {
        let validator = RangeValidator::shoe_size();
        for n in [-1.0, 16.1, 8.3, 16.5, 7.0000000001, 8.5000000001] {
            assert!(!validator.validate(&number(n)), "{} should be rejected", n);
        }
    }

    #[test]
    fn rejects_failed_recognition() {
        assert!(!RangeValidator::shoe_size().validate(&RecognitionResult::default()));
    }

    #[test]
    fn rejects_non_numeric_value() {
        let text = RecognitionResult {
            value: Some(ScalarValue::Text("ten".to_string())),
        };
        assert!(!RangeValidator::shoe_size().validate(&text));
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        assert!(RangeValidator::new(5.0, 1.0).is_err());
    }

    #[test]
    fn with_step_rejects_non_positive() {
        let range = RangeValidator::new(0.0, 10.0).unwrap();
        assert!(range.with_step(0.0).is_err());
        assert!(range.with_step(-0.5).is_err());
    }

    #[test]
    fn without_step_accepts_any_value_in_range() {
        let range = RangeValidator::new(1.0, 2.0).unwrap();
        assert!(range.accepts(1.37));
        assert!(!range.accepts(2.01));
    }
}
