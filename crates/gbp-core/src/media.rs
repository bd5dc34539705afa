//! Absorbing media along the optical axis.
//!
//! Media only attenuate the beam power; they never change the beam
//! parameter. Refraction belongs to the interfaces in
//! [`OpticalSystem`](crate::system::OpticalSystem).
//!
//! A [`MediaStack`] is a background medium plus boundaries. The medium
//! that starts at a boundary fills the axis up to the next boundary, so a
//! boundary position belongs to the downstream medium.

use crate::error::{BeamError, BeamResult};
use crate::units::Length;

/// A homogeneous medium.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Medium {
    /// No attenuation.
    #[default]
    Transparent,
    /// Beer–Lambert attenuation $T = e^{-\alpha \Delta z}$; `absorption_coefficient` in 1/cm.
    LinearAbsorber { absorption_coefficient: f64 },
}

impl Medium {
    /// A linear absorber with coefficient `alpha` per centimetre.
    pub fn linear_absorber(alpha_per_cm: f64) -> BeamResult<Self> {
        let medium = Medium::LinearAbsorber { absorption_coefficient: alpha_per_cm };
        medium.validate()?;
        Ok(medium)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Medium::Transparent => "Transparent",
            Medium::LinearAbsorber { .. } => "Linear Absorber",
        }
    }

    pub fn validate(&self) -> BeamResult<()> {
        match *self {
            Medium::Transparent => Ok(()),
            Medium::LinearAbsorber { absorption_coefficient: a } => {
                if a.is_finite() && a >= 0.0 {
                    Ok(())
                } else {
                    Err(BeamError::Configuration(format!(
                        "absorption coefficient must be non-negative and finite, got {} /cm",
                        a
                    )))
                }
            }
        }
    }

    /// Attenuation per centimetre.
    pub fn absorption_coefficient(&self) -> f64 {
        match *self {
            Medium::Transparent => 0.0,
            Medium::LinearAbsorber { absorption_coefficient } => absorption_coefficient,
        }
    }

    /// Fraction of power transmitted over a path of `dz` cm.
    pub fn transmission(&self, dz: f64) -> f64 {
        (-self.absorption_coefficient() * dz).exp()
    }
}

/// Media laid out along the axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaStack {
    background: Medium,
    /// Sorted by position; ties keep insertion order.
    boundaries: Vec<(f64, Medium)>,
}

impl MediaStack {
    /// A transparent stack with no boundaries.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, medium: Medium) -> BeamResult<Self> {
        medium.validate()?;
        self.background = medium;
        Ok(self)
    }

    pub fn background(&self) -> Medium {
        self.background
    }

    /// Start `medium` at `position`; it extends to the next boundary.
    pub fn add_boundary(&mut self, position: Length, medium: Medium) -> BeamResult<&mut Self> {
        let position = position.as_cm() + 0.0;
        if !position.is_finite() {
            return Err(BeamError::Configuration(format!(
                "{} boundary position must be finite, got {}",
                medium.kind(),
                position
            )));
        }
        medium.validate()?;
        let idx = self.boundaries.partition_point(|(p, _)| *p <= position);
        self.boundaries.insert(idx, (position, medium));
        Ok(self)
    }

    /// Place `medium` over `[front, front + thickness)` and restore the
    /// background behind it.
    pub fn add_layer(
        &mut self,
        front: Length,
        thickness: Length,
        medium: Medium,
    ) -> BeamResult<&mut Self> {
        let t = thickness.as_cm();
        if !(t.is_finite() && t >= 0.0) {
            return Err(BeamError::Configuration(format!(
                "layer thickness must be non-negative and finite, got {} cm",
                t
            )));
        }
        self.add_boundary(front, medium)?;
        let background = self.background;
        self.add_boundary(front + thickness, background)
    }

    pub fn boundaries(&self) -> &[(f64, Medium)] {
        &self.boundaries
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// The medium filling position `z`.
    pub fn medium_at(&self, z: Length) -> Medium {
        self.medium_at_cm(z.as_cm())
    }

    fn medium_at_cm(&self, z: f64) -> Medium {
        let idx = self.boundaries.partition_point(|(p, _)| *p <= z);
        match idx {
            0 => self.background,
            i => self.boundaries[i - 1].1,
        }
    }

    /// Signed optical depth $\int_{z_i}^{z_f} \alpha\,dz$.
    pub fn optical_depth(&self, zi: Length, zf: Length) -> f64 {
        let (zi, zf) = (zi.as_cm(), zf.as_cm());
        if zf < zi {
            return -self.optical_depth(Length::cm(zf), Length::cm(zi));
        }
        let start = self.boundaries.partition_point(|(p, _)| *p <= zi);
        let mut medium = self.medium_at_cm(zi);
        let mut z = zi;
        let mut depth = 0.0;
        for &(p, next) in &self.boundaries[start..] {
            if p >= zf {
                break;
            }
            depth += medium.absorption_coefficient() * (p - z);
            z = p;
            medium = next;
        }
        depth + medium.absorption_coefficient() * (zf - z)
    }

    /// Fraction of power that survives from `zi` to `zf`. Greater than one
    /// when `zf` lies upstream of `zi` inside an absorber.
    pub fn transmission(&self, zi: Length, zf: Length) -> f64 {
        (-self.optical_depth(zi, zf)).exp()
    }
}
