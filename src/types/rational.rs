//! Rational numbers in `numerator/denominator` text form
//!
//! EXIF stores exposure times, apertures and similar values as rationals;
//! XMP writes them as `n/d` text.

use crate::core::error::{XmpError, XmpResult};
use crate::core::field::Element;
use std::fmt;
use std::str::FromStr;

/// A signed rational number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator
    pub num: i64,
    /// Denominator
    pub den: i64,
}

impl Rational {
    /// Create a rational
    pub fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Floating point value, `None` for a zero denominator
    pub fn value(&self) -> Option<f64> {
        (self.den != 0).then(|| self.num as f64 / self.den as f64)
    }

    /// Whether the value can be written
    pub fn is_valid(&self) -> bool {
        self.den != 0 || self.num == 0
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || XmpError::Unmarshal(format!("invalid rational '{}'", s));
        match s.split_once('/') {
            Some((num, den)) => Ok(Self {
                num: num.trim().parse().map_err(|_| invalid())?,
                den: den.trim().parse().map_err(|_| invalid())?,
            }),
            None => Ok(Self {
                num: s.parse().map_err(|_| invalid())?,
                den: 1,
            }),
        }
    }
}

impl Element for Rational {
    fn to_text(&self) -> XmpResult<String> {
        if !self.is_valid() {
            return Err(XmpError::Marshal(format!(
                "rational {} has a zero denominator",
                self
            )));
        }
        Ok(self.to_string())
    }

    fn from_text(text: &str) -> XmpResult<Self> {
        text.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("1/250".parse::<Rational>().unwrap(), Rational::new(1, 250));
        assert_eq!(" 28 ".parse::<Rational>().unwrap(), Rational::new(28, 1));
        assert!("1/x".parse::<Rational>().is_err());
        assert!("".parse::<Rational>().is_err());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Rational::new(28, 10).to_text().unwrap(), "28/10");
        assert_eq!(Rational::new(0, 0).to_text().unwrap(), "0/0");
        assert!(matches!(
            Rational::new(3, 0).to_text(),
            Err(XmpError::Marshal(_))
        ));
        assert_eq!(Rational::new(1, 4).value(), Some(0.25));
    }
}
