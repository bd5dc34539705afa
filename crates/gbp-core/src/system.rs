//! An optical train: elements placed along the optical axis.

use num_complex::Complex64;

use crate::element::OpticalElement;
use crate::error::{BeamError, BeamResult};
use crate::units::Length;

/// An element together with its axial position (cm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedElement {
    pub position: f64,
    pub element: OpticalElement,
}

impl PlacedElement {
    pub fn position(&self) -> Length {
        Length::cm(self.position)
    }

    /// Forward transform, with failures naming this element's position.
    pub fn transform(&self, q: Complex64, n: f64) -> BeamResult<(Complex64, f64)> {
        self.element
            .transform(q, n)
            .map_err(|e| e.at_position(self.position))
    }

    /// Inverse transform, with failures naming this element's position.
    pub fn inverse_transform(&self, q: Complex64, n: f64) -> BeamResult<(Complex64, f64)> {
        self.element
            .inverse_transform(q, n)
            .map_err(|e| e.at_position(self.position))
    }
}

/// An ordered collection of optical elements.
///
/// Elements may be added in any order; [`finalize`](Self::finalize) sorts
/// them by position. The sort is stable, so elements sharing a position are
/// applied in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalSystem {
    elements: Vec<PlacedElement>,
    sorted: bool,
}

impl OpticalSystem {
    pub fn new() -> Self {
        Self { elements: Vec::new(), sorted: true }
    }

    /// Place `element` at `position`.
    ///
    /// Fails with [`BeamError::InvalidElementKind`] for degenerate element
    /// parameters and [`BeamError::Configuration`] for a non-finite position.
    pub fn add(&mut self, position: Length, element: OpticalElement) -> BeamResult<&mut Self> {
        // Adding +0.0 folds -0.0 into +0.0 so signed zeros tie under total_cmp.
        let position = position.as_cm() + 0.0;
        if !position.is_finite() {
            return Err(BeamError::Configuration(format!(
                "{} position must be finite, got {}",
                element.kind(),
                position
            )));
        }
        element.validate().map_err(|e| e.at_position(position))?;

        if let Some(last) = self.elements.last() {
            if position < last.position {
                self.sorted = false;
            }
        }
        self.elements.push(PlacedElement { position, element });
        Ok(self)
    }

    /// Stable-sort the elements by axial position.
    pub fn finalize(&mut self) -> &mut Self {
        if !self.sorted {
            self.elements.sort_by(|a, b| a.position.total_cmp(&b.position));
            self.sorted = true;
        }
        self
    }

    pub fn is_finalized(&self) -> bool {
        self.sorted
    }

    /// Elements in axial order once finalized; insertion order otherwise.
    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    /// Elements in axial order regardless of whether the system was finalized.
    pub fn ordered(&self) -> Vec<PlacedElement> {
        let mut ordered = self.elements.clone();
        if !self.sorted {
            ordered.sort_by(|a, b| a.position.total_cmp(&b.position));
        }
        ordered
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for OpticalSystem {
    fn default() -> Self {
        Self::new()
    }
}
