//! Paraxial optical elements and their closed-form action on $q$.
//!
//! The kind set is small and fixed, so elements are a closed enum and every
//! transform is an exhaustive `match`. Each transform has an algebraic
//! inverse used when the beam is traced upstream of its waist.
//!
//! # Sign convention
//!
//! A [`SphericalInterface`](OpticalElement::SphericalInterface) has a positive
//! radius of curvature when its centre of curvature lies downstream (+z) of
//! the surface, i.e. the surface bulges toward the incoming beam. With
//! `n_final > n_initial` such a surface converges the beam.

use num_complex::Complex64;

use crate::error::{BeamError, BeamResult};
use crate::units::Length;

/// Relative mismatch between the ambient index and an interface's declared
/// incoming index above which a warning is logged.
const INDEX_MISMATCH_TOLERANCE: f64 = 1e-9;

/// An optical element that acts on the beam at a single axial plane.
///
/// Lengths are in centimetres. Prefer the checked constructors
/// ([`thin_lens`](Self::thin_lens) etc.), which reject degenerate parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpticalElement {
    /// An ideal thin lens of focal length `focal_length` (cm, positive converges).
    ThinLens { focal_length: f64 },
    /// A plane boundary between two media.
    FlatInterface { n_initial: f64, n_final: f64 },
    /// A spherical boundary between two media; see the module docs for the
    /// sign of `radius_of_curvature` (cm).
    SphericalInterface {
        radius_of_curvature: f64,
        n_initial: f64,
        n_final: f64,
    },
}

impl OpticalElement {
    pub fn thin_lens(focal_length: Length) -> BeamResult<Self> {
        let element = OpticalElement::ThinLens { focal_length: focal_length.as_cm() };
        element.validate()?;
        Ok(element)
    }

    pub fn flat_interface(n_initial: f64, n_final: f64) -> BeamResult<Self> {
        let element = OpticalElement::FlatInterface { n_initial, n_final };
        element.validate()?;
        Ok(element)
    }

    pub fn spherical_interface(
        radius_of_curvature: Length,
        n_initial: f64,
        n_final: f64,
    ) -> BeamResult<Self> {
        let element = OpticalElement::SphericalInterface {
            radius_of_curvature: radius_of_curvature.as_cm(),
            n_initial,
            n_final,
        };
        element.validate()?;
        Ok(element)
    }

    /// Human-readable name of the element kind.
    pub fn kind(&self) -> &'static str {
        match self {
            OpticalElement::ThinLens { .. } => "thin lens",
            OpticalElement::FlatInterface { .. } => "flat interface",
            OpticalElement::SphericalInterface { .. } => "spherical interface",
        }
    }

    /// Reject parameters that describe no physical element.
    pub fn validate(&self) -> BeamResult<()> {
        match *self {
            OpticalElement::ThinLens { focal_length } => {
                if focal_length == 0.0 || !focal_length.is_finite() {
                    return Err(self.invalid(format!(
                        "focal length must be finite and non-zero, got {} cm",
                        focal_length
                    )));
                }
            }
            OpticalElement::FlatInterface { n_initial, n_final } => {
                self.validate_indices(n_initial, n_final)?;
            }
            OpticalElement::SphericalInterface { radius_of_curvature, n_initial, n_final } => {
                if radius_of_curvature == 0.0 || !radius_of_curvature.is_finite() {
                    return Err(self.invalid(format!(
                        "radius of curvature must be finite and non-zero, got {} cm",
                        radius_of_curvature
                    )));
                }
                self.validate_indices(n_initial, n_final)?;
            }
        }
        Ok(())
    }

    fn validate_indices(&self, n_initial: f64, n_final: f64) -> BeamResult<()> {
        for (label, n) in [("initial", n_initial), ("final", n_final)] {
            if !(n.is_finite() && n > 0.0) {
                return Err(self.invalid(format!(
                    "{} refractive index must be positive and finite, got {}",
                    label, n
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> BeamError {
        BeamError::InvalidElementKind { kind: self.kind(), position_cm: None, reason }
    }

    /// Refractive index of the region downstream of the element, given the
    /// index upstream of it.
    pub fn outgoing_index(&self, n_in: f64) -> f64 {
        match *self {
            OpticalElement::ThinLens { .. } => n_in,
            OpticalElement::FlatInterface { n_final, .. }
            | OpticalElement::SphericalInterface { n_final, .. } => n_final,
        }
    }

    /// Refractive index of the region upstream of the element, given the
    /// index downstream of it.
    pub fn incoming_index(&self, n_out: f64) -> f64 {
        match *self {
            OpticalElement::ThinLens { .. } => n_out,
            OpticalElement::FlatInterface { n_initial, .. }
            | OpticalElement::SphericalInterface { n_initial, .. } => n_initial,
        }
    }

    /// Apply the element to a beam arriving with parameter `q_in` in a
    /// medium of index `n_in`; returns the outgoing `(q, n)`.
    pub fn transform(&self, q_in: Complex64, n_in: f64) -> BeamResult<(Complex64, f64)> {
        self.validate()?;
        let q_out = match *self {
            OpticalElement::ThinLens { focal_length } => {
                // 1/q' = 1/q - 1/f
                invert(checked_inverse(q_in)? - 1.0 / focal_length)?
            }
            OpticalElement::FlatInterface { n_initial, n_final } => {
                warn_on_index_mismatch(self, "incoming", n_in, n_initial);
                q_in * (n_final / n_initial)
            }
            OpticalElement::SphericalInterface { radius_of_curvature, n_initial, n_final } => {
                warn_on_index_mismatch(self, "incoming", n_in, n_initial);
                // 1/q' = (n1/n2)(1/q) + (n1 - n2)/(n2 R)
                let power = (n_initial - n_final) / (n_final * radius_of_curvature);
                invert(checked_inverse(q_in)? * (n_initial / n_final) + power)?
            }
        };
        Ok((ensure_physical(q_out)?, self.outgoing_index(n_in)))
    }

    /// Undo [`transform`](Self::transform): given the parameter `q_out`
    /// leaving the element into a medium of index `n_out`, recover the
    /// incoming `(q, n)`.
    pub fn inverse_transform(&self, q_out: Complex64, n_out: f64) -> BeamResult<(Complex64, f64)> {
        self.validate()?;
        let q_in = match *self {
            OpticalElement::ThinLens { focal_length } => {
                invert(checked_inverse(q_out)? + 1.0 / focal_length)?
            }
            OpticalElement::FlatInterface { n_initial, n_final } => {
                warn_on_index_mismatch(self, "outgoing", n_out, n_final);
                q_out * (n_initial / n_final)
            }
            OpticalElement::SphericalInterface { radius_of_curvature, n_initial, n_final } => {
                warn_on_index_mismatch(self, "outgoing", n_out, n_final);
                // 1/q = (n2/n1)(1/q' - (n1 - n2)/(n2 R))
                let power = (n_initial - n_final) / (n_final * radius_of_curvature);
                invert((checked_inverse(q_out)? - power) * (n_final / n_initial))?
            }
        };
        Ok((ensure_physical(q_in)?, self.incoming_index(n_out)))
    }

    /// The equivalent ray transfer (ABCD) matrix, `[[A, B], [C, D]]`, acting
    /// as $q' = (Aq + B)/(Cq + D)$.
    pub fn ray_transfer_matrix(&self) -> [[f64; 2]; 2] {
        match *self {
            OpticalElement::ThinLens { focal_length } => [[1.0, 0.0], [-1.0 / focal_length, 1.0]],
            OpticalElement::FlatInterface { n_initial, n_final } => {
                [[1.0, 0.0], [0.0, n_initial / n_final]]
            }
            OpticalElement::SphericalInterface { radius_of_curvature, n_initial, n_final } => [
                [1.0, 0.0],
                [(n_initial - n_final) / (n_final * radius_of_curvature), n_initial / n_final],
            ],
        }
    }
}

fn checked_inverse(q: Complex64) -> BeamResult<Complex64> {
    if q.norm_sqr() == 0.0 {
        return Err(singular("beam parameter is zero"));
    }
    Ok(q.inv())
}

fn invert(inv_q: Complex64) -> BeamResult<Complex64> {
    if inv_q.norm_sqr() == 0.0 {
        return Err(singular("outgoing 1/q vanishes"));
    }
    Ok(inv_q.inv())
}

fn ensure_physical(q: Complex64) -> BeamResult<Complex64> {
    if !(q.re.is_finite() && q.im.is_finite()) {
        return Err(singular("beam parameter is not finite"));
    }
    if q.im <= 0.0 {
        return Err(singular("beam parameter lost its positive Rayleigh range"));
    }
    Ok(q)
}

fn singular(reason: &str) -> BeamError {
    BeamError::ElementTransform { position_cm: None, reason: reason.to_string() }
}

fn warn_on_index_mismatch(element: &OpticalElement, side: &str, ambient: f64, declared: f64) {
    if (ambient - declared).abs() > INDEX_MISMATCH_TOLERANCE * declared.abs().max(1.0) {
        log::warn!(
            "{} declares {} index {} but the beam travels in n = {}; using the declared index",
            element.kind(),
            side,
            declared,
            ambient
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn abcd(m: [[f64; 2]; 2], q: Complex64) -> Complex64 {
        (q * m[0][0] + m[0][1]) / (q * m[1][0] + m[1][1])
    }

    fn assert_q_eq(a: Complex64, b: Complex64) {
        assert_relative_eq!(a.re, b.re, epsilon = 1e-12, max_relative = 1e-9);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-12, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_focal_length_is_invalid() {
        let err = OpticalElement::thin_lens(Length::cm(0.0)).unwrap_err();
        assert!(matches!(err, BeamError::InvalidElementKind { kind: "thin lens", .. }));
    }

    #[test]
    fn test_zero_radius_is_invalid() {
        let err = OpticalElement::spherical_interface(Length::cm(0.0), 1.0, 1.5).unwrap_err();
        assert!(matches!(err, BeamError::InvalidElementKind { kind: "spherical interface", .. }));
    }

    #[test]
    fn test_unchecked_zero_focal_length_fails_transform() {
        let lens = OpticalElement::ThinLens { focal_length: 0.0 };
        let err = lens.transform(Complex64::new(0.0, 1.0), 1.0).unwrap_err();
        assert!(matches!(err, BeamError::InvalidElementKind { .. }));
    }

    #[test]
    fn test_thin_lens_focuses_collimated_beam_at_f() {
        // A beam with a very long Rayleigh range focuses close to f.
        let lens = OpticalElement::thin_lens(Length::cm(10.0)).unwrap();
        let (q, n) = lens.transform(Complex64::new(0.0, 1e6), 1.0).unwrap();
        assert_eq!(n, 1.0);
        // waist sits at -Re(q) downstream of the lens
        assert_relative_eq!(-q.re, 10.0, max_relative = 1e-6);
    }

    #[test]
    fn test_flat_interface_scales_q() {
        let flat = OpticalElement::flat_interface(1.0, 1.5).unwrap();
        let q = Complex64::new(-3.0, 2.0);
        let (q_out, n_out) = flat.transform(q, 1.0).unwrap();
        assert_q_eq(q_out, q * 1.5);
        assert_eq!(n_out, 1.5);
    }

    #[test]
    fn test_transforms_match_ray_transfer_matrices() {
        let q = Complex64::new(-2.5, 0.7);
        let elements = [
            OpticalElement::thin_lens(Length::cm(4.0)).unwrap(),
            OpticalElement::thin_lens(Length::cm(-3.0)).unwrap(),
            OpticalElement::flat_interface(1.0, 1.333).unwrap(),
            OpticalElement::spherical_interface(Length::cm(0.61), 1.0, 1.333).unwrap(),
            OpticalElement::spherical_interface(Length::cm(-2.0), 1.5, 1.0).unwrap(),
        ];
        for element in elements {
            let n_in = element.incoming_index(1.0);
            let (q_out, _) = element.transform(q, n_in).unwrap();
            assert_q_eq(q_out, abcd(element.ray_transfer_matrix(), q));
        }
    }

    #[test]
    fn test_inverse_recovers_input() {
        let q = Complex64::new(1.2, 0.05);
        let sphere = OpticalElement::spherical_interface(Length::cm(0.61), 1.0, 1.333).unwrap();
        let (q_out, n_out) = sphere.transform(q, 1.0).unwrap();
        assert_eq!(n_out, 1.333);
        let (q_back, n_back) = sphere.inverse_transform(q_out, n_out).unwrap();
        assert_q_eq(q_back, q);
        assert_eq!(n_back, 1.0);
    }

    #[test]
    fn test_convex_surface_converges_into_denser_medium() {
        // A collimated beam entering a convex (R > 0) denser surface comes to a
        // waist downstream, near the paraxial focus n2 R / (n2 - n1).
        let sphere = OpticalElement::spherical_interface(Length::cm(1.0), 1.0, 1.5).unwrap();
        let (q, _) = sphere.transform(Complex64::new(0.0, 1e6), 1.0).unwrap();
        assert!(-q.re > 0.0);
        assert_relative_eq!(-q.re, 3.0, max_relative = 1e-6);
    }

    #[test]
    fn test_zero_parameter_is_singular() {
        let lens = OpticalElement::thin_lens(Length::cm(1.0)).unwrap();
        let err = lens.transform(Complex64::new(0.0, 0.0), 1.0).unwrap_err();
        assert!(matches!(err, BeamError::ElementTransform { position_cm: None, .. }));
        let located = err.at_position(8.0);
        assert!(matches!(located, BeamError::ElementTransform { position_cm: Some(z), .. } if z == 8.0));
        assert!(located.to_string().contains("at z = 8 cm"));
    }
}
