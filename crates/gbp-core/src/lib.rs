//! # gbp-core
//!
//! Paraxial propagation of a Gaussian laser beam through an optical train of
//! thin lenses and refracting interfaces.
//!
//! ## Architecture
//!
//! A [`BeamDescriptor`] and an [`OpticalSystem`] go into a
//! [`propagation::BeamPropagator`]; out comes an immutable [`SegmentedBeam`]
//! that can be queried for the beam radius, wavefront curvature and
//! divergence at any axial position inside the requested range, including
//! upstream of the first element. The only implementation is the closed-form
//! [`PropagationEngine`].
//!
//! ## Modules
//!
//! - [`units`]: Typed lengths and angles at the crate boundary.
//! - [`types`]: Beam descriptor, axial range, samples and width conventions.
//! - [`beam_parameter`]: The complex beam parameter $q$.
//! - [`element`]: Thin lenses and flat/spherical interfaces.
//! - [`system`]: Elements placed along the axis.
//! - [`media`]: Absorbing media that attenuate the beam power.
//! - [`propagation`]: Propagator trait and the closed-form engine.
//! - [`segmented`]: The piecewise propagated beam and its queries.
//! - [`sweep`]: Parallel evaluation of many requests.
//! - [`error`]: The [`BeamError`] taxonomy.
//!
//! ## Example
//!
//! ```
//! use gbp_core::{AxialRange, BeamDescriptor, OpticalElement, OpticalSystem, PropagationEngine};
//! use gbp_core::units::{Angle, Length};
//!
//! let beam = BeamDescriptor::new(Length::nm(532.0)).with_divergence(Angle::mrad(10.0));
//! let mut system = OpticalSystem::new();
//! system.add(Length::cm(0.0), OpticalElement::thin_lens(Length::cm(7.0))?)?;
//! system.add(Length::cm(8.0), OpticalElement::thin_lens(Length::cm(1.0))?)?;
//!
//! let range = AxialRange::new(Length::cm(-10.0), Length::cm(10.0))?;
//! let propagated = PropagationEngine::new().run(&beam, &system, range)?;
//! let d = propagated.diameter_at(Length::cm(-10.0))?;
//! assert!((d.as_cm() - 0.2).abs() < 1e-3);
//! # Ok::<(), gbp_core::BeamError>(())
//! ```

pub mod beam_parameter;
pub mod element;
pub mod error;
pub mod media;
pub mod propagation;
pub mod segmented;
pub mod sweep;
pub mod system;
pub mod types;
pub mod units;

pub use beam_parameter::ComplexBeamParameter;
pub use element::OpticalElement;
pub use error::{BeamError, BeamResult};
pub use media::{MediaStack, Medium};
pub use propagation::{BeamPropagator, PropagationEngine};
pub use segmented::{Segment, SegmentedBeam, Waist};
pub use system::{OpticalSystem, PlacedElement};
pub use types::{
    AxialRange, BeamDescriptor, BeamProfile, BeamSample, DivergenceConvention, WidthConvention,
};
