//! Beam propagation abstraction and implementations.
//!
//! The [`BeamPropagator`] trait is the interface the CLI and the parallel
//! sweeps run against. [`engine::PropagationEngine`] is the closed-form
//! implementation: it walks the optical system outward from the waist in
//! both directions and records one free-space [`Segment`](crate::segmented::Segment)
//! per region.

pub mod engine;

pub use engine::PropagationEngine;

use crate::error::BeamResult;
use crate::segmented::SegmentedBeam;
use crate::system::OpticalSystem;
use crate::types::{AxialRange, BeamDescriptor};

/// Turns a beam descriptor and an optical system into a queryable beam.
///
/// Implementations must be pure: the same request always yields the same
/// [`SegmentedBeam`] or the same error, and neither input is mutated.
pub trait BeamPropagator: Send + Sync {
    /// Propagate `beam` through `system` and build a beam queryable over `range`.
    fn propagate(
        &self,
        beam: &BeamDescriptor,
        system: &OpticalSystem,
        range: AxialRange,
    ) -> BeamResult<SegmentedBeam>;

    /// Human-readable name of the propagation method.
    fn method_name(&self) -> &str;
}
