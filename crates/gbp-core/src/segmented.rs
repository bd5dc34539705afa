//! The propagated beam as a piecewise description of the optical axis.
//!
//! A [`SegmentedBeam`] partitions the real line into half-open segments
//! `[z_start, z_end)` that meet exactly at element positions. Within a
//! segment the beam is free-space propagation of a single
//! [`ComplexBeamParameter`]. Queries locate their segment by binary search
//! on `z_start`.

use std::f64::consts::PI;

use crate::beam_parameter::ComplexBeamParameter;
use crate::error::{BeamError, BeamResult};
use crate::media::MediaStack;
use crate::types::{AxialRange, BeamSample, DivergenceConvention, WidthConvention};
use crate::units::{Angle, Length};

/// One free-space region between two elements (or out to ±∞).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Inclusive lower bound (cm); `-∞` for the first segment.
    pub z_start: f64,
    /// Exclusive upper bound (cm); `+∞` for the last segment.
    pub z_end: f64,
    /// Beam parameter referenced inside this region.
    pub parameter: ComplexBeamParameter,
    /// Vacuum wavelength (cm).
    pub wavelength: f64,
    pub m_squared: f64,
}

impl Segment {
    /// Refractive index of the region.
    pub fn n(&self) -> f64 {
        self.parameter.n
    }

    pub fn contains(&self, z: f64) -> bool {
        z >= self.z_start && z < self.z_end
    }

    pub fn radius_at(&self, z: f64) -> f64 {
        self.parameter.radius_at(z, self.wavelength, self.m_squared)
    }

    pub fn curvature_at(&self, z: f64) -> f64 {
        self.parameter.curvature_at(z)
    }

    /// Far-field half-angle divergence of this region's beam (rad).
    pub fn divergence(&self) -> f64 {
        self.parameter.divergence(self.wavelength, self.m_squared)
    }

    /// Position of this region's (possibly virtual) waist.
    pub fn waist_position(&self) -> f64 {
        self.parameter.waist_position()
    }

    pub fn waist_radius(&self) -> f64 {
        self.parameter.waist_radius(self.wavelength, self.m_squared)
    }

    pub fn rayleigh_range(&self) -> f64 {
        self.parameter.rayleigh_range()
    }

    /// Whether the region's waist is real, i.e. lies inside the region.
    pub fn has_real_waist(&self) -> bool {
        self.contains(self.waist_position())
    }
}

/// A waist found along the propagated beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waist {
    pub position: Length,
    pub radius: Length,
}

/// Immutable result of a propagation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedBeam {
    segments: Vec<Segment>,
    range: AxialRange,
    power_w: Option<f64>,
    /// Position (cm) at which `power_w` holds.
    power_position: f64,
    media: MediaStack,
}

impl SegmentedBeam {
    /// Assemble a beam from segments ordered by `z_start`.
    ///
    /// The first segment must start at `-∞`, the last must end at `+∞`, and
    /// each segment must end where the next begins.
    pub fn new(segments: Vec<Segment>, range: AxialRange) -> BeamResult<Self> {
        let first = segments
            .first()
            .ok_or_else(|| BeamError::Configuration("a beam needs at least one segment".into()))?;
        let last = segments.last().unwrap_or(first);
        if first.z_start != f64::NEG_INFINITY || last.z_end != f64::INFINITY {
            return Err(BeamError::Configuration(
                "segments must cover the whole optical axis".into(),
            ));
        }
        if let Some(w) = segments.windows(2).find(|w| w[0].z_end != w[1].z_start) {
            return Err(BeamError::Configuration(format!(
                "segments leave a gap or overlap between z = {} and z = {} cm",
                w[0].z_end, w[1].z_start
            )));
        }
        Ok(Self {
            segments,
            range,
            power_w: None,
            power_position: 0.0,
            media: MediaStack::new(),
        })
    }

    /// Attach the beam power, measured at `position`.
    pub fn with_power(mut self, power_w: f64, position: Length) -> Self {
        self.power_w = Some(power_w);
        self.power_position = position.as_cm();
        self
    }

    /// Attach absorbing media; they scale the power but not the beam shape.
    pub fn with_media(mut self, media: MediaStack) -> Self {
        self.media = media;
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn range(&self) -> AxialRange {
        self.range
    }

    /// The configured power, before any absorption.
    pub fn power_w(&self) -> Option<f64> {
        self.power_w
    }

    pub fn media(&self) -> &MediaStack {
        &self.media
    }

    /// The segment covering `z`.
    pub fn segment_at(&self, z: Length) -> BeamResult<&Segment> {
        let z = self.check_range(z)?;
        Ok(self.locate(z))
    }

    fn check_range(&self, z: Length) -> BeamResult<f64> {
        if !self.range.contains(z) {
            return Err(BeamError::OutOfRangeQuery {
                z_cm: z.as_cm(),
                min_cm: self.range.min_cm(),
                max_cm: self.range.max_cm(),
            });
        }
        Ok(z.as_cm())
    }

    fn locate(&self, z: f64) -> &Segment {
        // Last segment whose start is <= z; the first starts at -inf so the
        // partition point is always >= 1.
        let idx = self.segments.partition_point(|s| s.z_start <= z);
        &self.segments[idx.saturating_sub(1)]
    }

    /// 1/e² radius at `z`.
    pub fn radius_at(&self, z: Length) -> BeamResult<Length> {
        let z = self.check_range(z)?;
        Ok(Length::cm(self.locate(z).radius_at(z)))
    }

    /// 1/e² diameter at `z`.
    pub fn diameter_at(&self, z: Length) -> BeamResult<Length> {
        Ok(self.radius_at(z)? * 2.0)
    }

    /// Beam width at `z` in the requested convention.
    pub fn width_at(&self, z: Length, convention: WidthConvention) -> BeamResult<Length> {
        Ok(self.radius_at(z)? * convention.factor())
    }

    /// Wavefront radius of curvature at `z`; infinite at a waist.
    pub fn curvature_at(&self, z: Length) -> BeamResult<Length> {
        let z = self.check_range(z)?;
        Ok(Length::cm(self.locate(z).curvature_at(z)))
    }

    /// 1/e² far-field half-angle divergence of the beam in the region containing `z`.
    pub fn divergence_at(&self, z: Length) -> BeamResult<Angle> {
        let z = self.check_range(z)?;
        Ok(Angle::rad(self.locate(z).divergence()))
    }

    pub fn divergence_with(&self, z: Length, convention: DivergenceConvention) -> BeamResult<Angle> {
        Ok(self.divergence_at(z)? * convention.factor())
    }

    /// Gouy phase relative to the waist of the region containing `z` (rad).
    pub fn gouy_phase_at(&self, z: Length) -> BeamResult<f64> {
        let z = self.check_range(z)?;
        Ok(self.locate(z).parameter.gouy_phase_at(z))
    }

    /// Beam power at `z` after the media between the power position and `z`.
    pub fn power_at(&self, z: Length) -> BeamResult<Option<f64>> {
        let z_cm = self.check_range(z)?;
        Ok(self.power_at_cm(z_cm))
    }

    fn power_at_cm(&self, z: f64) -> Option<f64> {
        self.power_w.map(|p| {
            p * self.media.transmission(Length::cm(self.power_position), Length::cm(z))
        })
    }

    /// On-axis irradiance $2P(z)/(\pi w^2)$ in W/cm², if the power is known.
    pub fn peak_irradiance_at(&self, z: Length) -> BeamResult<Option<f64>> {
        let z_cm = self.check_range(z)?;
        let w = self.locate(z_cm).radius_at(z_cm);
        Ok(self.power_at_cm(z_cm).map(|p| 2.0 * p / (PI * w * w)))
    }

    /// Positions of local radius minima inside the built range, in axial order.
    pub fn waist_positions(&self) -> Vec<Length> {
        self.waists().into_iter().map(|w| w.position).collect()
    }

    /// Every local minimum of the radius inside the built range.
    ///
    /// A minimum is either a segment's own waist lying inside that segment,
    /// or an element position where the beam arrives converging and leaves
    /// diverging. Virtual waists outside their segment are skipped.
    pub fn waists(&self) -> Vec<Waist> {
        let mut waists = Vec::new();
        for (j, segment) in self.segments.iter().enumerate() {
            if j > 0 {
                let p = segment.z_start;
                let upstream = &self.segments[j - 1];
                // Converging into p (waist at or past p) and diverging out of it.
                if upstream.waist_position() >= p && segment.waist_position() < p {
                    waists.push(Waist {
                        position: Length::cm(p),
                        radius: Length::cm(segment.radius_at(p)),
                    });
                }
            }
            if segment.has_real_waist() {
                waists.push(Waist {
                    position: Length::cm(segment.waist_position()),
                    radius: Length::cm(segment.waist_radius()),
                });
            }
        }
        waists.retain(|w| self.range.contains(w.position));
        waists
    }

    /// Everything the output contract requires at a single position.
    pub fn sample_at(&self, z: Length) -> BeamResult<BeamSample> {
        let z_cm = self.check_range(z)?;
        let segment = self.locate(z_cm);
        let radius = segment.radius_at(z_cm);
        Ok(BeamSample {
            z_cm,
            radius_cm: radius,
            diameter_cm: 2.0 * radius,
            radius_of_curvature_cm: segment.curvature_at(z_cm),
            divergence_rad: segment.divergence(),
            refractive_index: segment.n(),
            peak_irradiance_w_per_cm2: self
                .power_at_cm(z_cm)
                .map(|p| 2.0 * p / (PI * radius * radius)),
        })
    }

    /// `n` samples equally spaced over the built range.
    pub fn sample(&self, n: usize) -> BeamResult<Vec<BeamSample>> {
        self.range.linspace(n).into_iter().map(|z| self.sample_at(z)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WL: f64 = 532e-7;

    fn free_space(w0: f64, z_w: f64) -> SegmentedBeam {
        let parameter = ComplexBeamParameter::at_waist(w0, WL, 1.0, 1.0, z_w);
        let segment = Segment {
            z_start: f64::NEG_INFINITY,
            z_end: f64::INFINITY,
            parameter,
            wavelength: WL,
            m_squared: 1.0,
        };
        let range = AxialRange::new(Length::cm(-50.0), Length::cm(50.0)).unwrap();
        SegmentedBeam::new(vec![segment], range)
            .unwrap()
            .with_power(1.0, Length::cm(0.0))
    }

    #[test]
    fn test_out_of_range_query() {
        let beam = free_space(0.01, 0.0);
        let err = beam.radius_at(Length::cm(50.5)).unwrap_err();
        assert_eq!(
            err,
            BeamError::OutOfRangeQuery { z_cm: 50.5, min_cm: -50.0, max_cm: 50.0 }
        );
        assert!(beam.radius_at(Length::cm(50.0)).is_ok());
        assert!(beam.segment_at(Length::cm(-50.0)).is_ok());
    }

    #[test]
    fn test_single_waist_found() {
        let beam = free_space(0.01, 3.0);
        let waists = beam.waists();
        assert_eq!(waists.len(), 1);
        assert_relative_eq!(waists[0].position.as_cm(), 3.0);
        assert_relative_eq!(waists[0].radius.as_cm(), 0.01, max_relative = 1e-12);
    }

    #[test]
    fn test_waist_outside_range_is_not_reported() {
        let beam = free_space(0.01, 80.0);
        assert!(beam.waist_positions().is_empty());
    }

    #[test]
    fn test_peak_irradiance_at_waist() {
        let beam = free_space(0.01, 0.0);
        let e0 = beam.peak_irradiance_at(Length::cm(0.0)).unwrap().unwrap();
        assert_relative_eq!(e0, 2.0 / (PI * 1e-4), max_relative = 1e-12);
    }

    #[test]
    fn test_power_is_constant_without_media() {
        let beam = free_space(0.01, 0.0);
        assert_eq!(beam.power_w(), Some(1.0));
        assert_eq!(beam.power_at(Length::cm(-40.0)).unwrap(), Some(1.0));
        assert!(beam.media().is_empty());

        let unpowered = SegmentedBeam::new(beam.segments().to_vec(), beam.range()).unwrap();
        assert_eq!(unpowered.power_w(), None);
        assert_eq!(unpowered.peak_irradiance_at(Length::cm(0.0)).unwrap(), None);
    }

    #[test]
    fn test_sample_contract() {
        let beam = free_space(0.01, 0.0);
        let samples = beam.sample(11).unwrap();
        assert_eq!(samples.len(), 11);
        assert_relative_eq!(samples[0].z_cm, -50.0);
        assert_relative_eq!(samples[10].z_cm, 50.0);
        for s in &samples {
            assert_relative_eq!(s.diameter_cm, 2.0 * s.radius_cm);
            assert_relative_eq!(s.divergence_rad, WL / (PI * 0.01), max_relative = 1e-12);
        }
        // the middle sample sits on the waist
        assert!(samples[5].radius_of_curvature_cm.is_infinite());
    }

    #[test]
    fn test_rejects_gapped_segments() {
        let parameter = ComplexBeamParameter::at_waist(0.01, WL, 1.0, 1.0, 0.0);
        let a = Segment {
            z_start: f64::NEG_INFINITY,
            z_end: 1.0,
            parameter,
            wavelength: WL,
            m_squared: 1.0,
        };
        let b = Segment { z_start: 2.0, z_end: f64::INFINITY, ..a };
        let range = AxialRange::new(Length::cm(0.0), Length::cm(3.0)).unwrap();
        assert!(SegmentedBeam::new(vec![a, b], range).is_err());
    }
}
