//! The complex beam parameter $q$ and its free-space algebra.
//!
//! A Gaussian beam of vacuum wavelength $\lambda$, quality factor $M^2$ in a
//! medium of index $n$ is fully described at each axial position by
//!
//! $$\frac{1}{q} = \frac{1}{R} - i\frac{\lambda M^2}{\pi n w^2}$$
//!
//! where $R$ is the wavefront radius of curvature and $w$ the 1/e² radius.
//! $q$ is the physical (un-reduced) parameter, so free-space propagation is a
//! plain translation $q(z) = q(z_{\text{ref}}) + (z - z_{\text{ref}})$ and the
//! real part of $q$ is the signed distance past the local waist.
//!
//! All lengths are in centimetres.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// $q$ evaluated at a reference position inside a region of uniform index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexBeamParameter {
    /// The complex parameter at `z_ref`.
    pub q: Complex64,
    /// Axial position at which `q` is evaluated (cm).
    pub z_ref: f64,
    /// Refractive index of the region.
    pub n: f64,
}

impl ComplexBeamParameter {
    pub fn new(q: Complex64, z_ref: f64, n: f64) -> Self {
        Self { q, z_ref, n }
    }

    /// The parameter at a waist of 1/e² radius `w0`:
    /// $q_0 = i \pi n w_0^2 / (\lambda M^2)$ (flat wavefront).
    pub fn at_waist(w0: f64, wavelength: f64, m_squared: f64, n: f64, z_waist: f64) -> Self {
        let z_r = PI * n * w0 * w0 / (wavelength * m_squared);
        Self {
            q: Complex64::new(0.0, z_r),
            z_ref: z_waist,
            n,
        }
    }

    /// Translate by `dz` through the region's medium.
    pub fn propagate(&self, dz: f64) -> Self {
        Self {
            q: self.q + dz,
            z_ref: self.z_ref + dz,
            n: self.n,
        }
    }

    /// Re-reference the parameter at position `z`.
    pub fn propagate_to(&self, z: f64) -> Self {
        Self {
            q: self.q + (z - self.z_ref),
            z_ref: z,
            n: self.n,
        }
    }

    /// $q$ at position `z` without re-referencing.
    pub fn q_at(&self, z: f64) -> Complex64 {
        self.q + (z - self.z_ref)
    }

    /// 1/e² beam radius at `z`: $w = \sqrt{-\lambda M^2 / (\pi n\, \mathrm{Im}(1/q))}$.
    pub fn radius_at(&self, z: f64, wavelength: f64, m_squared: f64) -> f64 {
        let inv_q = self.q_at(z).inv();
        (-wavelength * m_squared / (PI * self.n * inv_q.im)).sqrt()
    }

    /// Wavefront radius of curvature at `z`: $R = 1/\mathrm{Re}(1/q)$.
    ///
    /// Positive for a diverging beam (past its waist), infinite at the waist.
    pub fn curvature_at(&self, z: f64) -> f64 {
        let re = self.q_at(z).inv().re;
        if re == 0.0 {
            f64::INFINITY
        } else {
            1.0 / re
        }
    }

    /// Axial position where $\mathrm{Re}(1/q) = 0$, i.e. the local waist.
    pub fn waist_position(&self) -> f64 {
        self.z_ref - self.q.re
    }

    /// Rayleigh range $z_R = \mathrm{Im}(q)$; invariant under free-space propagation.
    pub fn rayleigh_range(&self) -> f64 {
        self.q.im
    }

    /// Radius at the local waist: $w_0 = \sqrt{z_R \lambda M^2 / (\pi n)}$.
    pub fn waist_radius(&self, wavelength: f64, m_squared: f64) -> f64 {
        (self.rayleigh_range() * wavelength * m_squared / (PI * self.n)).sqrt()
    }

    /// Far-field 1/e² half-angle divergence $\theta = \lambda M^2 / (\pi n w_0)$.
    pub fn divergence(&self, wavelength: f64, m_squared: f64) -> f64 {
        wavelength * m_squared / (PI * self.n * self.waist_radius(wavelength, m_squared))
    }

    /// Gouy phase relative to the local waist (rad).
    pub fn gouy_phase_at(&self, z: f64) -> f64 {
        ((z - self.waist_position()) / self.rayleigh_range()).atan()
    }

    /// Whether this is a physical beam parameter (finite, positive Rayleigh range).
    pub fn is_physical(&self) -> bool {
        self.q.re.is_finite() && self.q.im.is_finite() && self.q.im > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const WL: f64 = 632.8e-7;

    #[test]
    fn test_waist_parameter_is_pure_imaginary() {
        let p = ComplexBeamParameter::at_waist(0.05, WL, 1.0, 1.0, 2.0);
        assert_eq!(p.q.re, 0.0);
        assert_relative_eq!(p.rayleigh_range(), PI * 0.05 * 0.05 / WL, max_relative = 1e-12);
        assert_relative_eq!(p.radius_at(2.0, WL, 1.0), 0.05, max_relative = 1e-12);
        assert!(p.curvature_at(2.0).is_infinite());
    }

    #[test]
    fn test_radius_grows_by_sqrt2_at_rayleigh_range() {
        let p = ComplexBeamParameter::at_waist(0.02, WL, 1.0, 1.0, 0.0);
        let z_r = p.rayleigh_range();
        assert_relative_eq!(
            p.radius_at(z_r, WL, 1.0),
            0.02 * std::f64::consts::SQRT_2,
            max_relative = 1e-12
        );
        // R(z_R) = 2 z_R
        assert_relative_eq!(p.curvature_at(z_r), 2.0 * z_r, max_relative = 1e-12);
        assert_relative_eq!(p.curvature_at(-z_r), -2.0 * z_r, max_relative = 1e-12);
    }

    #[test]
    fn test_waist_position_survives_reference_shift() {
        let p = ComplexBeamParameter::at_waist(0.02, WL, 1.0, 1.0, 3.0);
        let shifted = p.propagate_to(-7.5);
        assert_abs_diff_eq!(shifted.waist_position(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(shifted.rayleigh_range(), p.rayleigh_range(), epsilon = 1e-15);
    }

    #[test]
    fn test_rayleigh_range_scales_with_index() {
        let vac = ComplexBeamParameter::at_waist(0.02, WL, 1.0, 1.0, 0.0);
        let glass = ComplexBeamParameter::at_waist(0.02, WL, 1.0, 1.5, 0.0);
        assert_relative_eq!(glass.rayleigh_range(), 1.5 * vac.rayleigh_range(), max_relative = 1e-12);
        assert_relative_eq!(glass.waist_radius(WL, 1.0), 0.02, max_relative = 1e-12);
        assert_relative_eq!(glass.divergence(WL, 1.0), vac.divergence(WL, 1.0) / 1.5, max_relative = 1e-12);
    }

    #[test]
    fn test_m_squared_scales_divergence() {
        let p = ComplexBeamParameter::at_waist(0.02, WL, 2.0, 1.0, 0.0);
        assert_relative_eq!(p.divergence(WL, 2.0), 2.0 * WL / (PI * 0.02), max_relative = 1e-12);
        assert_relative_eq!(p.waist_radius(WL, 2.0), 0.02, max_relative = 1e-12);
    }

    #[test]
    fn test_gouy_phase() {
        let p = ComplexBeamParameter::at_waist(0.02, WL, 1.0, 1.0, 1.0);
        assert_abs_diff_eq!(p.gouy_phase_at(1.0), 0.0);
        assert_relative_eq!(
            p.gouy_phase_at(1.0 + p.rayleigh_range()),
            PI / 4.0,
            max_relative = 1e-12
        );
    }
}
