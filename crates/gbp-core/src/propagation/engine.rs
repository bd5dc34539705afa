//! Closed-form propagation through a sequence of paraxial elements.
//!
//! # Traversal
//!
//! Element positions $p_0 \le p_1 \le \dots \le p_{m-1}$ cut the axis into
//! $m + 1$ regions. The waist at $z_w$ lies in region $k$, where $k$ is the
//! number of elements strictly upstream of $z_w$ (an element exactly at the
//! waist is applied on the forward pass).
//!
//! - **Forward**: starting from $q_0$, propagate to $p_j$ and apply the
//!   element for $j = k, \dots, m - 1$.
//! - **Backward**: starting again from $q_0$, propagate back to $p_j$ and
//!   apply the inverse element for $j = k - 1, \dots, 0$.
//!
//! Both passes only ever re-reference $q$ at an element, so the beam radius is
//! continuous across every segment boundary.

use log::debug;

use super::BeamPropagator;
use crate::beam_parameter::ComplexBeamParameter;
use crate::error::BeamResult;
use crate::segmented::{Segment, SegmentedBeam};
use crate::system::{OpticalSystem, PlacedElement};
use crate::types::{AxialRange, BeamDescriptor, ResolvedBeam};
use crate::units::Length;

/// The closed-form Gaussian beam propagator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagationEngine;

impl PropagationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Propagate `beam` through `system`; see [`BeamPropagator::propagate`].
    ///
    /// The system does not need to be finalized: elements are traversed in a
    /// stably sorted view.
    pub fn run(
        &self,
        beam: &BeamDescriptor,
        system: &OpticalSystem,
        range: AxialRange,
    ) -> BeamResult<SegmentedBeam> {
        let resolved = beam.resolve()?;
        let elements = system.ordered();
        let parameters = region_parameters(&resolved, &elements)?;

        let segments = parameters
            .iter()
            .enumerate()
            .map(|(j, &parameter)| Segment {
                z_start: if j == 0 { f64::NEG_INFINITY } else { elements[j - 1].position },
                z_end: elements.get(j).map_or(f64::INFINITY, |e| e.position),
                parameter,
                wavelength: resolved.wavelength_cm,
                m_squared: resolved.m_squared,
            })
            .collect();

        let beam = SegmentedBeam::new(segments, range)?;
        Ok(match resolved.power_w {
            Some(p) => beam.with_power(p, Length::cm(resolved.power_position_cm)),
            None => beam,
        })
    }
}

impl BeamPropagator for PropagationEngine {
    fn propagate(
        &self,
        beam: &BeamDescriptor,
        system: &OpticalSystem,
        range: AxialRange,
    ) -> BeamResult<SegmentedBeam> {
        self.run(beam, system, range)
    }

    fn method_name(&self) -> &str {
        "Closed-form complex beam parameter"
    }
}

/// The beam parameter of every region, upstream to downstream.
///
/// `elements` must be sorted by position.
fn region_parameters(
    beam: &ResolvedBeam,
    elements: &[PlacedElement],
) -> BeamResult<Vec<ComplexBeamParameter>> {
    let z_w = beam.waist_position_cm;
    let q0 = ComplexBeamParameter::at_waist(
        beam.waist_radius_cm,
        beam.wavelength_cm,
        beam.m_squared,
        beam.refractive_index,
        z_w,
    );
    debug!(
        "Waist at z = {} cm: w0 = {:.6e} cm, z_R = {:.6e} cm, n = {}",
        z_w,
        beam.waist_radius_cm,
        q0.rayleigh_range(),
        q0.n
    );

    let k = elements.partition_point(|e| e.position < z_w);
    let (upstream, downstream) = elements.split_at(k);

    let mut backward = Vec::with_capacity(upstream.len());
    let mut current = q0;
    for placed in upstream.iter().rev() {
        let arriving = current.propagate_to(placed.position);
        let (q, n) = placed.inverse_transform(arriving.q, arriving.n)?;
        current = ComplexBeamParameter::new(q, placed.position, n);
        debug!(
            "Backward through {} at z = {} cm: z_R = {:.6e} cm, n = {}",
            placed.element.kind(),
            placed.position,
            current.rayleigh_range(),
            n
        );
        backward.push(current);
    }

    let mut parameters = Vec::with_capacity(elements.len() + 1);
    parameters.extend(backward.into_iter().rev());
    parameters.push(q0);

    let mut current = q0;
    for placed in downstream {
        let arriving = current.propagate_to(placed.position);
        let (q, n) = placed.transform(arriving.q, arriving.n)?;
        current = ComplexBeamParameter::new(q, placed.position, n);
        debug!(
            "Forward through {} at z = {} cm: waist at {:.6} cm, z_R = {:.6e} cm, n = {}",
            placed.element.kind(),
            placed.position,
            current.waist_position(),
            current.rayleigh_range(),
            n
        );
        parameters.push(current);
    }

    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::OpticalElement;
    use crate::error::BeamError;
    use crate::units::Length;
    use approx::assert_relative_eq;

    fn beam(w0_cm: f64, z_w: f64) -> BeamDescriptor {
        BeamDescriptor::new(Length::nm(1064.0))
            .with_waist_radius(Length::cm(w0_cm))
            .with_waist_position(Length::cm(z_w))
    }

    fn range() -> AxialRange {
        AxialRange::new(Length::cm(-20.0), Length::cm(20.0)).unwrap()
    }

    #[test]
    fn test_empty_system_is_a_single_segment() {
        let result = PropagationEngine::new()
            .run(&beam(0.05, 1.0), &OpticalSystem::new(), range())
            .unwrap();
        assert_eq!(result.segments().len(), 1);
        assert_relative_eq!(result.segments()[0].waist_position(), 1.0);
    }

    #[test]
    fn test_element_at_waist_goes_forward() {
        let mut system = OpticalSystem::new();
        system
            .add(Length::cm(2.0), OpticalElement::thin_lens(Length::cm(10.0)).unwrap())
            .unwrap();
        let result = PropagationEngine::new().run(&beam(0.05, 2.0), &system, range()).unwrap();
        let segments = result.segments();
        assert_eq!(segments.len(), 2);
        // the upstream segment is the unmodified input beam
        assert_eq!(segments[0].parameter.q.re, 0.0);
        assert_relative_eq!(segments[0].waist_position(), 2.0);
        // a positive lens at the waist moves the waist downstream
        assert!(segments[1].waist_position() > 2.0);
    }

    #[test]
    fn test_coincident_elements_give_empty_segment() {
        let mut system = OpticalSystem::new();
        let lens = OpticalElement::thin_lens(Length::cm(10.0)).unwrap();
        system.add(Length::cm(5.0), lens).unwrap();
        system.add(Length::cm(5.0), lens).unwrap();
        let result = PropagationEngine::new().run(&beam(0.05, 0.0), &system, range()).unwrap();
        let segments = result.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].z_start, segments[1].z_end);
        // two f = 10 lenses in contact act as one f = 5 lens
        let mut single = OpticalSystem::new();
        single
            .add(Length::cm(5.0), OpticalElement::thin_lens(Length::cm(5.0)).unwrap())
            .unwrap();
        let reference = PropagationEngine::new().run(&beam(0.05, 0.0), &single, range()).unwrap();
        let z = Length::cm(12.0);
        assert_relative_eq!(
            result.radius_at(z).unwrap().as_cm(),
            reference.radius_at(z).unwrap().as_cm(),
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_interface_index_carries_downstream() {
        let mut system = OpticalSystem::new();
        system
            .add(Length::cm(3.0), OpticalElement::flat_interface(1.0, 1.5).unwrap())
            .unwrap();
        let result = PropagationEngine::new().run(&beam(0.05, 0.0), &system, range()).unwrap();
        assert_eq!(result.segments()[0].n(), 1.0);
        assert_eq!(result.segments()[1].n(), 1.5);
        // a flat interface stretches the Rayleigh range by n2/n1
        assert_relative_eq!(
            result.segments()[1].rayleigh_range(),
            1.5 * result.segments()[0].rayleigh_range(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_underspecified_beam_is_rejected() {
        let descriptor = BeamDescriptor::new(Length::nm(532.0));
        let err = PropagationEngine::new()
            .run(&descriptor, &OpticalSystem::new(), range())
            .unwrap_err();
        assert_eq!(err, BeamError::UnderspecifiedBeam);
    }

    #[test]
    fn test_method_name() {
        assert!(!PropagationEngine::new().method_name().is_empty());
    }
}
