//! Error taxonomy for beam construction, propagation and queries.

use thiserror::Error;

/// Errors raised while building or querying a propagated beam.
///
/// None of these are recovered inside the engine: the computation is
/// closed-form, so a failing request fails the same way every time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeamError {
    /// Neither a waist radius nor a divergence was supplied.
    #[error("Beam is underspecified: either a waist radius or a divergence is required")]
    UnderspecifiedBeam,

    /// The beam descriptor or the requested range is contradictory or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An element was constructed with parameters that describe no physical element.
    #[error("Invalid {kind}{}: {reason}", describe_position(.position_cm))]
    InvalidElementKind { kind: &'static str, position_cm: Option<f64>, reason: String },

    /// Applying an element transform (or its inverse) was singular.
    ///
    /// `position_cm` is filled in once the element is placed in a system.
    #[error("Element transform failed{}: {reason}", describe_position(.position_cm))]
    ElementTransform { position_cm: Option<f64>, reason: String },

    /// A query fell outside the axial range the beam was built for.
    #[error("Query at z = {z_cm} cm is outside the built range [{min_cm}, {max_cm}] cm")]
    OutOfRangeQuery { z_cm: f64, min_cm: f64, max_cm: f64 },

    /// A quantity carried a unit of the wrong dimension, or an unknown unit.
    #[error("Unit mismatch: expected a {expected} unit, found '{found}'")]
    UnitMismatch { expected: &'static str, found: String },
}

impl BeamError {
    /// Whether this error stems from the beam descriptor rather than the
    /// optical system or a query.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, BeamError::UnderspecifiedBeam | BeamError::Configuration(_))
    }

    /// Attach the axial position of the offending element, if this error
    /// came from an element and does not name one yet.
    pub fn at_position(self, position_cm: f64) -> Self {
        match self {
            BeamError::ElementTransform { position_cm: None, reason } => {
                BeamError::ElementTransform { position_cm: Some(position_cm), reason }
            }
            BeamError::InvalidElementKind { kind, position_cm: None, reason } => {
                BeamError::InvalidElementKind { kind, position_cm: Some(position_cm), reason }
            }
            other => other,
        }
    }
}

fn describe_position(position_cm: &Option<f64>) -> String {
    match position_cm {
        Some(z) => format!(" at z = {} cm", z),
        None => String::new(),
    }
}

pub type BeamResult<T> = Result<T, BeamError>;
