//! Core request and result types shared across the propagation pipeline.
//!
//! A request is a [`BeamDescriptor`] plus an [`OpticalSystem`](crate::system::OpticalSystem)
//! and an [`AxialRange`]; the result of a query is a [`BeamSample`].

use std::f64::consts::{LN_2, PI, SQRT_2};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};
use crate::units::{Angle, Length};

/// Physical description of the input beam.
///
/// Exactly one of [`waist_radius`](Self::waist_radius) and
/// [`divergence`](Self::divergence) must be set; the other is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamDescriptor {
    /// Vacuum wavelength.
    pub wavelength: Length,
    /// Beam power (W), if known.
    pub power_w: Option<f64>,
    /// Where [`power_w`](Self::power_w) is measured. Only matters inside absorbing media.
    pub power_position: Length,
    /// 1/e² waist radius.
    pub waist_radius: Option<Length>,
    /// 1/e² far-field half-angle divergence.
    pub divergence: Option<Angle>,
    /// Axial position of the waist.
    pub waist_position: Length,
    /// A measured diameter that places the waist; overrides `waist_position`.
    pub profile: Option<BeamProfile>,
    /// Beam quality factor M² (1 for an ideal Gaussian).
    pub m_squared: f64,
    /// Refractive index of the medium the waist sits in.
    pub refractive_index: f64,
}

impl BeamDescriptor {
    /// A descriptor with only the wavelength set. The waist sits at z = 0 in
    /// vacuum with M² = 1; a waist radius or divergence must still be added.
    pub fn new(wavelength: Length) -> Self {
        Self {
            wavelength,
            power_w: None,
            power_position: Length::cm(0.0),
            waist_radius: None,
            divergence: None,
            waist_position: Length::cm(0.0),
            profile: None,
            m_squared: 1.0,
            refractive_index: 1.0,
        }
    }

    pub fn with_waist_radius(mut self, radius: Length) -> Self {
        self.waist_radius = Some(radius);
        self
    }

    pub fn with_divergence(mut self, divergence: Angle) -> Self {
        self.divergence = Some(divergence);
        self
    }

    pub fn with_waist_position(mut self, position: Length) -> Self {
        self.waist_position = position;
        self
    }

    pub fn with_m_squared(mut self, m_squared: f64) -> Self {
        self.m_squared = m_squared;
        self
    }

    pub fn with_refractive_index(mut self, n: f64) -> Self {
        self.refractive_index = n;
        self
    }

    pub fn with_power(mut self, power_w: f64) -> Self {
        self.power_w = Some(power_w);
        self
    }

    pub fn with_power_position(mut self, position: Length) -> Self {
        self.power_position = position;
        self
    }

    /// Place the waist upstream of a position where the 1/e² diameter was measured.
    pub fn with_profile(mut self, position: Length, diameter: Length) -> Self {
        self.profile = Some(BeamProfile { position, diameter });
        self
    }

    /// Validate the descriptor and convert it to canonical units.
    ///
    /// When only the divergence is known the waist radius follows from
    /// $w_0 = \lambda M^2 / (\pi n \theta)$.
    pub fn resolve(&self) -> BeamResult<ResolvedBeam> {
        let wavelength_cm = self.wavelength.as_cm();
        if !(wavelength_cm.is_finite() && wavelength_cm > 0.0) {
            return Err(BeamError::Configuration(format!(
                "wavelength must be positive and finite, got {}",
                self.wavelength
            )));
        }
        if !(self.m_squared.is_finite() && self.m_squared >= 1.0) {
            return Err(BeamError::Configuration(format!(
                "beam quality factor M² must be finite and >= 1, got {}",
                self.m_squared
            )));
        }
        let n = self.refractive_index;
        if !(n.is_finite() && n > 0.0) {
            return Err(BeamError::Configuration(format!(
                "refractive index must be positive and finite, got {}",
                n
            )));
        }
        if !self.waist_position.is_finite() {
            return Err(BeamError::Configuration("waist position must be finite".into()));
        }
        if !self.power_position.is_finite() {
            return Err(BeamError::Configuration("power position must be finite".into()));
        }
        if let Some(p) = self.power_w {
            if !(p.is_finite() && p >= 0.0) {
                return Err(BeamError::Configuration(format!(
                    "power must be non-negative and finite, got {} W",
                    p
                )));
            }
        }

        let waist_radius_cm = match (self.waist_radius, self.divergence) {
            (None, None) => return Err(BeamError::UnderspecifiedBeam),
            (Some(_), Some(_)) => {
                return Err(BeamError::Configuration(
                    "both waist radius and divergence were given; supply exactly one".into(),
                ))
            }
            (Some(w0), None) => {
                let w0 = w0.as_cm();
                if !(w0.is_finite() && w0 > 0.0) {
                    return Err(BeamError::Configuration(format!(
                        "waist radius must be positive and finite, got {} cm",
                        w0
                    )));
                }
                w0
            }
            (None, Some(theta)) => {
                let theta = theta.as_rad();
                if !(theta.is_finite() && theta > 0.0) {
                    return Err(BeamError::Configuration(format!(
                        "divergence must be positive and finite, got {} rad",
                        theta
                    )));
                }
                wavelength_cm * self.m_squared / (PI * n * theta)
            }
        };

        let waist_position_cm = match &self.profile {
            Some(profile) => {
                profile.waist_position(waist_radius_cm, wavelength_cm, self.m_squared, n)?
            }
            None => self.waist_position.as_cm(),
        };

        Ok(ResolvedBeam {
            wavelength_cm,
            waist_radius_cm,
            waist_position_cm,
            m_squared: self.m_squared,
            refractive_index: n,
            power_w: self.power_w,
            power_position_cm: self.power_position.as_cm(),
        })
    }
}

/// A 1/e² diameter measured at an axial position.
///
/// Together with the waist radius it fixes the waist position, assuming the
/// beam is already expanding where it was measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamProfile {
    pub position: Length,
    pub diameter: Length,
}

impl BeamProfile {
    /// $z_w = z - z_R\sqrt{(d / 2w_0)^2 - 1}$.
    pub fn waist_position(
        &self,
        w0: f64,
        wavelength: f64,
        m_squared: f64,
        n: f64,
    ) -> BeamResult<f64> {
        let (z, d) = (self.position.as_cm(), self.diameter.as_cm());
        if !(z.is_finite() && d.is_finite() && d > 0.0) {
            return Err(BeamError::Configuration(format!(
                "beam profile needs a finite position and a positive diameter, got {} at {}",
                self.diameter, self.position
            )));
        }
        if d < 2.0 * w0 {
            return Err(BeamError::Configuration(format!(
                "beam diameter {} cm at z = {} cm is smaller than the waist diameter {} cm",
                d,
                z,
                2.0 * w0
            )));
        }
        let z_r = PI * n * w0 * w0 / (wavelength * m_squared);
        let ratio = d / (2.0 * w0);
        Ok(z - z_r * (ratio * ratio - 1.0).sqrt())
    }
}

/// A validated beam descriptor in canonical units (cm, rad).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBeam {
    pub wavelength_cm: f64,
    pub waist_radius_cm: f64,
    pub waist_position_cm: f64,
    pub m_squared: f64,
    pub refractive_index: f64,
    pub power_w: Option<f64>,
    pub power_position_cm: f64,
}

/// The closed axial interval a propagated beam may be queried over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxialRange {
    min_cm: f64,
    max_cm: f64,
}

impl AxialRange {
    pub fn new(min: Length, max: Length) -> BeamResult<Self> {
        let (min_cm, max_cm) = (min.as_cm(), max.as_cm());
        if !(min_cm.is_finite() && max_cm.is_finite()) {
            return Err(BeamError::Configuration("axial range bounds must be finite".into()));
        }
        if min_cm > max_cm {
            return Err(BeamError::Configuration(format!(
                "axial range is inverted: min {} cm > max {} cm",
                min_cm, max_cm
            )));
        }
        Ok(Self { min_cm, max_cm })
    }

    pub fn min(&self) -> Length {
        Length::cm(self.min_cm)
    }

    pub fn max(&self) -> Length {
        Length::cm(self.max_cm)
    }

    pub(crate) fn min_cm(&self) -> f64 {
        self.min_cm
    }

    pub(crate) fn max_cm(&self) -> f64 {
        self.max_cm
    }

    pub fn contains(&self, z: Length) -> bool {
        let z = z.as_cm();
        z >= self.min_cm && z <= self.max_cm
    }

    /// `n` equally spaced positions from `min` to `max` inclusive.
    pub fn linspace(&self, n: usize) -> Vec<Length> {
        match n {
            0 => Vec::new(),
            1 => vec![self.min()],
            _ => (0..n)
                .map(|i| {
                    let t = i as f64 / (n - 1) as f64;
                    Length::cm(self.min_cm + (self.max_cm - self.min_cm) * t)
                })
                .collect(),
        }
    }
}

/// The beam at a single axial position: the output contract of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSample {
    /// Axial position (cm).
    pub z_cm: f64,
    /// 1/e² radius (cm).
    pub radius_cm: f64,
    /// 1/e² diameter (cm).
    pub diameter_cm: f64,
    /// Wavefront radius of curvature (cm); infinite at a waist.
    pub radius_of_curvature_cm: f64,
    /// 1/e² far-field half-angle divergence (rad).
    pub divergence_rad: f64,
    /// Refractive index of the region containing `z_cm`.
    pub refractive_index: f64,
    /// On-axis irradiance 2P/(πw²) (W/cm²), when the beam power is known.
    pub peak_irradiance_w_per_cm2: Option<f64>,
}

/// Beam width conventions, each a fixed multiple of the 1/e² radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidthConvention {
    #[default]
    OneOverESquaredRadius,
    OneOverESquaredDiameter,
    OneOverERadius,
    OneOverEDiameter,
    FwhmRadius,
    FwhmDiameter,
    /// Siegman's second-moment width; equal to the 1/e² radius for a Gaussian.
    SecondMoment,
    D4Sigma,
}

impl WidthConvention {
    /// Multiplier applied to the 1/e² radius.
    pub fn factor(self) -> f64 {
        match self {
            WidthConvention::OneOverESquaredRadius | WidthConvention::SecondMoment => 1.0,
            WidthConvention::OneOverESquaredDiameter | WidthConvention::D4Sigma => 2.0,
            WidthConvention::OneOverERadius => 1.0 / SQRT_2,
            WidthConvention::OneOverEDiameter => SQRT_2,
            WidthConvention::FwhmRadius => (LN_2 / 2.0).sqrt(),
            WidthConvention::FwhmDiameter => (2.0 * LN_2).sqrt(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WidthConvention::OneOverESquaredRadius => "1/e^2 radius",
            WidthConvention::OneOverESquaredDiameter => "1/e^2 diameter",
            WidthConvention::OneOverERadius => "1/e radius",
            WidthConvention::OneOverEDiameter => "1/e diameter",
            WidthConvention::FwhmRadius => "fwhm radius",
            WidthConvention::FwhmDiameter => "fwhm diameter",
            WidthConvention::SecondMoment => "second moment",
            WidthConvention::D4Sigma => "d4sigma",
        }
    }
}

impl FromStr for WidthConvention {
    type Err = BeamError;

    fn from_str(s: &str) -> BeamResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace('²', "^2");
        match key.as_str() {
            "1/e^2 radius" | "1/e2 radius" => Ok(WidthConvention::OneOverESquaredRadius),
            "1/e^2 diameter" | "1/e2 diameter" => Ok(WidthConvention::OneOverESquaredDiameter),
            "1/e radius" => Ok(WidthConvention::OneOverERadius),
            "1/e diameter" => Ok(WidthConvention::OneOverEDiameter),
            "fwhm radius" => Ok(WidthConvention::FwhmRadius),
            "fwhm diameter" | "fwhm" => Ok(WidthConvention::FwhmDiameter),
            "second moment" | "second-moment" => Ok(WidthConvention::SecondMoment),
            "d4sigma" | "d4σ" => Ok(WidthConvention::D4Sigma),
            _ => Err(BeamError::Configuration(format!("unknown width convention '{}'", s))),
        }
    }
}

/// Divergence conventions, each a fixed multiple of the 1/e² half angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DivergenceConvention {
    #[default]
    OneOverESquaredHalfAngle,
    OneOverESquaredFullAngle,
    OneOverEHalfAngle,
    OneOverEFullAngle,
    FwhmHalfAngle,
    FwhmFullAngle,
}

impl DivergenceConvention {
    pub fn factor(self) -> f64 {
        match self {
            DivergenceConvention::OneOverESquaredHalfAngle => 1.0,
            DivergenceConvention::OneOverESquaredFullAngle => 2.0,
            DivergenceConvention::OneOverEHalfAngle => 1.0 / SQRT_2,
            DivergenceConvention::OneOverEFullAngle => SQRT_2,
            DivergenceConvention::FwhmHalfAngle => (LN_2 / 2.0).sqrt(),
            DivergenceConvention::FwhmFullAngle => (2.0 * LN_2).sqrt(),
        }
    }
}
