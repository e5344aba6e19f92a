//! Request input parsing
//!
//! Validates the two user inputs of an estimation request: the pincode and
//! the land area in hectares.

use crate::{AgriProfitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in an Indian postal code
pub const PINCODE_LENGTH: usize = 6;

/// A syntactically valid six-digit pincode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pincode(String);

impl Pincode {
    /// Parse a pincode. Surrounding whitespace and any inner spaces ("613 005") are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized: String = input.trim().chars().filter(|c| *c != ' ').collect();

        if normalized.is_empty() {
            return Err(AgriProfitError::invalid_input("Pincode cannot be empty"));
        }

        if normalized.len() != PINCODE_LENGTH || !normalized.chars().all(|c| c.is_ascii_digit()) {
            return Err(AgriProfitError::invalid_input(format!(
                "Please select a valid {PINCODE_LENGTH}-digit pincode, got: '{}'",
                input.trim()
            )));
        }

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Pincode {
    type Error = AgriProfitError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Pincode> for String {
    fn from(value: Pincode) -> Self {
        value.0
    }
}

/// A strictly positive, finite land area in hectares
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct LandArea(f64);

impl LandArea {
    pub fn new(hectares: f64) -> Result<Self> {
        if !hectares.is_finite() || hectares <= 0.0 {
            return Err(AgriProfitError::invalid_input(format!(
                "Please enter a valid land area greater than 0, got: {hectares}"
            )));
        }
        Ok(Self(hectares))
    }

    #[must_use]
    pub fn hectares(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for LandArea {
    type Error = AgriProfitError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LandArea> for f64 {
    fn from(value: LandArea) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("613005", "613005")]
    #[case("  495661 ", "495661")]
    #[case("613 005", "613005")]
    #[case("6 1 3 0 0 5", "613005")]
    fn test_valid_pincodes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Pincode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("61300")]
    #[case("6130055")]
    #[case("61300a")]
    #[case("SW1A1AA")]
    #[case("-13005")]
    fn test_invalid_pincodes(#[case] input: &str) {
        let err = Pincode::parse(input).unwrap_err();
        assert!(matches!(err, AgriProfitError::InvalidInput { .. }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-2.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_land_area(#[case] hectares: f64) {
        assert!(matches!(
            LandArea::new(hectares),
            Err(AgriProfitError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_valid_land_area() {
        assert_eq!(LandArea::new(2.5).unwrap().hectares(), 2.5);
    }

    #[test]
    fn test_serde_validation() {
        let pincode: Pincode = serde_json::from_str("\"613005\"").unwrap();
        assert_eq!(pincode.to_string(), "613005");
        assert!(serde_json::from_str::<Pincode>("\"abc\"").is_err());
        assert!(serde_json::from_str::<LandArea>("-1.0").is_err());
    }
}
