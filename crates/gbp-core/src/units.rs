//! Typed physical quantities at the library boundary.
//!
//! All internal math runs in one canonical family: lengths in centimetres and
//! angles in radians. [`Length`] and [`Angle`] are thin newtypes over those
//! canonical values; conversion happens only when a value enters or leaves
//! the crate.
//!
//! ```
//! use gbp_core::units::{Length, LengthUnit};
//!
//! let wavelength = Length::new(532.0, LengthUnit::Nanometre);
//! assert!((wavelength.to(LengthUnit::Micrometre) - 0.532).abs() < 1e-12);
//!
//! let parsed: Length = "0.61 cm".parse().unwrap();
//! assert_eq!(parsed.as_cm(), 0.61);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use crate::error::{BeamError, BeamResult};

/// Supported length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Nanometre,
    Micrometre,
    Millimetre,
    Centimetre,
    Metre,
    Inch,
}

impl LengthUnit {
    /// Number of centimetres in one of this unit.
    pub fn centimetres(self) -> f64 {
        match self {
            LengthUnit::Nanometre => 1e-7,
            LengthUnit::Micrometre => 1e-4,
            LengthUnit::Millimetre => 0.1,
            LengthUnit::Centimetre => 1.0,
            LengthUnit::Metre => 100.0,
            LengthUnit::Inch => 2.54,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Nanometre => "nm",
            LengthUnit::Micrometre => "um",
            LengthUnit::Millimetre => "mm",
            LengthUnit::Centimetre => "cm",
            LengthUnit::Metre => "m",
            LengthUnit::Inch => "in",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = BeamError;

    fn from_str(s: &str) -> BeamResult<Self> {
        match s.trim() {
            "nm" | "nanometer" | "nanometre" | "nanometers" | "nanometres" => {
                Ok(LengthUnit::Nanometre)
            }
            "um" | "µm" | "micron" | "microns" | "micrometer" | "micrometre" => {
                Ok(LengthUnit::Micrometre)
            }
            "mm" | "millimeter" | "millimetre" | "millimeters" | "millimetres" => {
                Ok(LengthUnit::Millimetre)
            }
            "cm" | "centimeter" | "centimetre" | "centimeters" | "centimetres" => {
                Ok(LengthUnit::Centimetre)
            }
            "m" | "meter" | "metre" | "meters" | "metres" => Ok(LengthUnit::Metre),
            "in" | "inch" | "inches" => Ok(LengthUnit::Inch),
            other => Err(BeamError::UnitMismatch {
                expected: "length",
                found: other.to_string(),
            }),
        }
    }
}

/// Supported angle units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    Radian,
    Milliradian,
    Microradian,
    Degree,
}

impl AngleUnit {
    /// Number of radians in one of this unit.
    pub fn radians(self) -> f64 {
        match self {
            AngleUnit::Radian => 1.0,
            AngleUnit::Milliradian => 1e-3,
            AngleUnit::Microradian => 1e-6,
            AngleUnit::Degree => std::f64::consts::PI / 180.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AngleUnit::Radian => "rad",
            AngleUnit::Milliradian => "mrad",
            AngleUnit::Microradian => "urad",
            AngleUnit::Degree => "deg",
        }
    }
}

impl FromStr for AngleUnit {
    type Err = BeamError;

    fn from_str(s: &str) -> BeamResult<Self> {
        match s.trim() {
            "rad" | "radian" | "radians" => Ok(AngleUnit::Radian),
            "mrad" | "milliradian" | "milliradians" => Ok(AngleUnit::Milliradian),
            "urad" | "µrad" | "microradian" | "microradians" => Ok(AngleUnit::Microradian),
            "deg" | "degree" | "degrees" => Ok(AngleUnit::Degree),
            other => Err(BeamError::UnitMismatch {
                expected: "angle",
                found: other.to_string(),
            }),
        }
    }
}

/// A length, stored in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Length(f64);

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self(value * unit.centimetres())
    }

    /// Shorthand for a length already expressed in the canonical unit.
    pub const fn cm(value: f64) -> Self {
        Self(value)
    }

    pub fn nm(value: f64) -> Self {
        Self::new(value, LengthUnit::Nanometre)
    }

    pub fn mm(value: f64) -> Self {
        Self::new(value, LengthUnit::Millimetre)
    }

    pub fn to(self, unit: LengthUnit) -> f64 {
        self.0 / unit.centimetres()
    }

    pub const fn as_cm(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Parse a `"<value> <unit>"` string, using `default_unit` when the unit
    /// is omitted.
    pub fn parse_with_default(s: &str, default_unit: LengthUnit) -> BeamResult<Self> {
        let (value, unit) = split_quantity(s)?;
        let unit = match unit {
            Some(u) => u.parse()?,
            None => default_unit,
        };
        Ok(Self::new(value, unit))
    }
}

impl FromStr for Length {
    type Err = BeamError;

    fn from_str(s: &str) -> BeamResult<Self> {
        Self::parse_with_default(s, LengthUnit::Centimetre)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cm", self.0)
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Mul<Length> for f64 {
    type Output = Length;
    fn mul(self, rhs: Length) -> Length {
        Length(self * rhs.0)
    }
}

impl Div<f64> for Length {
    type Output = Length;
    fn div(self, rhs: f64) -> Length {
        Length(self.0 / rhs)
    }
}

/// Ratio of two lengths (dimensionless).
impl Div<Length> for Length {
    type Output = f64;
    fn div(self, rhs: Length) -> f64 {
        self.0 / rhs.0
    }
}

/// An angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub fn new(value: f64, unit: AngleUnit) -> Self {
        Self(value * unit.radians())
    }

    pub const fn rad(value: f64) -> Self {
        Self(value)
    }

    pub fn mrad(value: f64) -> Self {
        Self::new(value, AngleUnit::Milliradian)
    }

    pub fn to(self, unit: AngleUnit) -> f64 {
        self.0 / unit.radians()
    }

    pub const fn as_rad(self) -> f64 {
        self.0
    }

    pub fn parse_with_default(s: &str, default_unit: AngleUnit) -> BeamResult<Self> {
        let (value, unit) = split_quantity(s)?;
        let unit = match unit {
            Some(u) => u.parse()?,
            None => default_unit,
        };
        Ok(Self::new(value, unit))
    }
}

impl FromStr for Angle {
    type Err = BeamError;

    fn from_str(s: &str) -> BeamResult<Self> {
        Self::parse_with_default(s, AngleUnit::Radian)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rad", self.0)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;
    fn mul(self, rhs: f64) -> Angle {
        Angle(self.0 * rhs)
    }
}

/// Parse an optical power such as `"5 mW"` into watts. A bare number is
/// taken to be in watts.
pub fn parse_power_watts(s: &str) -> BeamResult<f64> {
    let (value, unit) = split_quantity(s)?;
    let scale = match unit {
        None | Some("W") => 1.0,
        Some("kW") => 1e3,
        Some("mW") => 1e-3,
        Some("uW") | Some("µW") => 1e-6,
        Some(other) => {
            return Err(BeamError::UnitMismatch { expected: "power", found: other.to_string() })
        }
    };
    Ok(value * scale)
}

/// Split `"1.5e-3 mm"` / `"10mrad"` / `"7"` into its number and optional unit.
fn split_quantity(s: &str) -> BeamResult<(f64, Option<&str>)> {
    let s = s.trim();
    let number = s.trim_end_matches(|c: char| c.is_alphabetic() || c == 'µ');
    let unit = s[number.len()..].trim();
    let value: f64 = number.trim().parse().map_err(|_| {
        BeamError::Configuration(format!("'{}' is not a number followed by a unit", s))
    })?;
    Ok((value, if unit.is_empty() { None } else { Some(unit) }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_length_conversions() {
        let l = Length::new(25.4, LengthUnit::Millimetre);
        assert_relative_eq!(l.to(LengthUnit::Inch), 1.0, epsilon = 1e-12);
        assert_relative_eq!(Length::nm(532.0).as_cm(), 5.32e-5, epsilon = 1e-18);
    }

    #[test]
    fn test_parse_with_and_without_space() {
        let a: Length = "10 mm".parse().unwrap();
        let b: Length = "10mm".parse().unwrap();
        assert_eq!(a, b);
        assert_relative_eq!(a.as_cm(), 1.0);

        let small = Length::parse_with_default("1e-3mm", LengthUnit::Centimetre).unwrap();
        assert_relative_eq!(small.as_cm(), 1e-4, epsilon = 1e-18);
    }

    #[test]
    fn test_parse_default_unit() {
        let wl = Length::parse_with_default("532", LengthUnit::Nanometre).unwrap();
        assert_relative_eq!(wl.to(LengthUnit::Nanometre), 532.0, epsilon = 1e-9);

        let div = Angle::parse_with_default("10", AngleUnit::Milliradian).unwrap();
        assert_relative_eq!(div.as_rad(), 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_wrong_dimension_is_unit_mismatch() {
        let err = "10 mrad".parse::<Length>().unwrap_err();
        assert_eq!(
            err,
            BeamError::UnitMismatch { expected: "length", found: "mrad".into() }
        );
        let err = Angle::parse_with_default("3 cm", AngleUnit::Radian).unwrap_err();
        assert!(matches!(err, BeamError::UnitMismatch { expected: "angle", .. }));
    }

    #[test]
    fn test_garbage_is_configuration_error() {
        let err = "ten cm".parse::<Length>().unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_power_units() {
        assert_relative_eq!(parse_power_watts("1").unwrap(), 1.0);
        assert_relative_eq!(parse_power_watts("5 mW").unwrap(), 5e-3);
        assert!(matches!(
            parse_power_watts("5 cm"),
            Err(BeamError::UnitMismatch { expected: "power", .. })
        ));
    }

    #[test]
    fn test_length_arithmetic() {
        let a = Length::cm(3.0);
        let b = Length::mm(10.0);
        assert_relative_eq!((a + b).as_cm(), 4.0);
        assert_relative_eq!((a - b).as_cm(), 2.0);
        assert_relative_eq!(a / b, 3.0);
        assert!(b < a);
        assert_relative_eq!((2.0 * a).as_cm(), 6.0);
    }
}
