//! Data-parallel evaluation of independent propagation requests.
//!
//! Each request is a pure function of its inputs, so requests are spread over
//! the Rayon thread pool without any shared state. Results come back in
//! input order.

use rayon::prelude::*;

use crate::error::BeamResult;
use crate::propagation::BeamPropagator;
use crate::segmented::SegmentedBeam;
use crate::system::OpticalSystem;
use crate::types::{AxialRange, BeamDescriptor};
use crate::units::Length;

/// One self-contained propagation request.
#[derive(Debug, Clone)]
pub struct BeamRequest {
    pub beam: BeamDescriptor,
    pub system: OpticalSystem,
    pub range: AxialRange,
}

/// Run every request in parallel.
pub fn run_many<P: BeamPropagator>(
    propagator: &P,
    requests: &[BeamRequest],
) -> Vec<BeamResult<SegmentedBeam>> {
    log::debug!(
        "Running {} requests with {} on {} threads",
        requests.len(),
        propagator.method_name(),
        rayon::current_num_threads()
    );
    requests
        .par_iter()
        .map(|r| propagator.propagate(&r.beam, &r.system, r.range))
        .collect()
}

/// Propagate the same beam and system once per waist position.
///
/// Everything in `beam` except its waist position is kept; a measured
/// profile would pin the waist, so it is dropped.
pub fn sweep_waist_positions<P: BeamPropagator>(
    propagator: &P,
    beam: &BeamDescriptor,
    system: &OpticalSystem,
    range: AxialRange,
    positions: &[Length],
) -> Vec<BeamResult<SegmentedBeam>> {
    positions
        .par_iter()
        .map(|&z_w| {
            let mut shifted = beam.clone().with_waist_position(z_w);
            shifted.profile = None;
            propagator.propagate(&shifted, system, range)
        })
        .collect()
}
