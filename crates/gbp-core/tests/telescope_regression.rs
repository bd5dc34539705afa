//! Regression test: beam through a 7:1 telescope into a spherical water surface.
//!
//! The expected diameters live in `fixtures/telescope_7x50.json` so they can
//! be diffed independently of the code.

use approx::assert_relative_eq;
use gbp_core::sweep::sweep_waist_positions;
use gbp_core::units::{Angle, Length};
use gbp_core::{
    AxialRange, BeamDescriptor, OpticalElement, OpticalSystem, PropagationEngine, SegmentedBeam,
};
use serde::Deserialize;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FixtureElement {
    ThinLens { position_cm: f64, focal_length_cm: f64 },
    SphericalInterface { position_cm: f64, radius_of_curvature_cm: f64, n_initial: f64, n_final: f64 },
}

#[derive(Debug, Deserialize)]
struct DiameterPoint {
    z_cm: f64,
    diameter_cm: f64,
}

#[derive(Debug, Deserialize)]
struct SegmentWaist {
    waist_position_cm: f64,
    rayleigh_range_cm: f64,
}

#[derive(Debug, Deserialize)]
struct SweepRow {
    waist_position_cm: f64,
    diameters_cm: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    wavelength_nm: f64,
    divergence_mrad: f64,
    range_cm: [f64; 2],
    elements: Vec<FixtureElement>,
    waist_radius_cm: f64,
    rayleigh_range_cm: f64,
    diameters: Vec<DiameterPoint>,
    segments: Vec<SegmentWaist>,
    waist_sweep: Vec<SweepRow>,
    waist_sweep_z_cm: Vec<f64>,
}

fn load_fixture() -> Fixture {
    let raw = include_str!("fixtures/telescope_7x50.json");
    serde_json::from_str(raw).expect("fixture should parse")
}

fn build(fixture: &Fixture) -> (BeamDescriptor, OpticalSystem, AxialRange) {
    let beam = BeamDescriptor::new(Length::nm(fixture.wavelength_nm))
        .with_divergence(Angle::mrad(fixture.divergence_mrad));
    let mut system = OpticalSystem::new();
    for element in &fixture.elements {
        let (z, element) = match *element {
            FixtureElement::ThinLens { position_cm, focal_length_cm } => (
                position_cm,
                OpticalElement::thin_lens(Length::cm(focal_length_cm)).unwrap(),
            ),
            FixtureElement::SphericalInterface {
                position_cm,
                radius_of_curvature_cm,
                n_initial,
                n_final,
            } => (
                position_cm,
                OpticalElement::spherical_interface(
                    Length::cm(radius_of_curvature_cm),
                    n_initial,
                    n_final,
                )
                .unwrap(),
            ),
        };
        system.add(Length::cm(z), element).unwrap();
    }
    system.finalize();
    let range =
        AxialRange::new(Length::cm(fixture.range_cm[0]), Length::cm(fixture.range_cm[1])).unwrap();
    (beam, system, range)
}

fn diameter(beam: &SegmentedBeam, z_cm: f64) -> f64 {
    beam.diameter_at(Length::cm(z_cm)).unwrap().as_cm()
}

#[test]
fn test_diameters_match_snapshot() {
    let fixture = load_fixture();
    let (beam, system, range) = build(&fixture);
    let result = PropagationEngine::new().run(&beam, &system, range).unwrap();

    for point in &fixture.diameters {
        assert_relative_eq!(
            diameter(&result, point.z_cm),
            point.diameter_cm,
            max_relative = TOLERANCE
        );
    }
}

#[test]
fn test_input_waist_from_divergence() {
    let fixture = load_fixture();
    let (beam, _, _) = build(&fixture);
    let resolved = beam.resolve().unwrap();
    assert_relative_eq!(resolved.waist_radius_cm, fixture.waist_radius_cm, max_relative = TOLERANCE);

    let (_, system, range) = build(&fixture);
    let result = PropagationEngine::new().run(&beam, &system, range).unwrap();
    assert_relative_eq!(
        result.segments()[0].rayleigh_range(),
        fixture.rayleigh_range_cm,
        max_relative = TOLERANCE
    );
    assert_relative_eq!(
        result.divergence_at(Length::cm(-50.0)).unwrap().as_rad(),
        fixture.divergence_mrad * 1e-3,
        max_relative = TOLERANCE
    );
}

#[test]
fn test_segment_waists_match_snapshot() {
    let fixture = load_fixture();
    let (beam, system, range) = build(&fixture);
    let result = PropagationEngine::new().run(&beam, &system, range).unwrap();

    assert_eq!(result.segments().len(), fixture.segments.len());
    for (segment, expected) in result.segments().iter().zip(&fixture.segments) {
        assert_relative_eq!(
            segment.waist_position(),
            expected.waist_position_cm,
            epsilon = 1e-12,
            max_relative = TOLERANCE
        );
        assert_relative_eq!(
            segment.rayleigh_range(),
            expected.rayleigh_range_cm,
            max_relative = TOLERANCE
        );
    }
    // The input waist sits on the first lens and the waist between the
    // lenses lies past the surface at 9 cm, so both are virtual.
    let waists = result.waist_positions();
    assert_eq!(waists.len(), 2);
    assert_relative_eq!(waists[0].as_cm(), fixture.segments[1].waist_position_cm, max_relative = TOLERANCE);
    assert_relative_eq!(waists[1].as_cm(), fixture.segments[3].waist_position_cm, max_relative = TOLERANCE);
}

#[test]
fn test_waist_position_sweep() {
    let fixture = load_fixture();
    let (beam, system, range) = build(&fixture);
    let positions: Vec<Length> =
        fixture.waist_sweep.iter().map(|row| Length::cm(row.waist_position_cm)).collect();

    let results = sweep_waist_positions(&PropagationEngine::new(), &beam, &system, range, &positions);
    assert_eq!(results.len(), fixture.waist_sweep.len());

    for (row, result) in fixture.waist_sweep.iter().zip(results) {
        let result = result.unwrap();
        for (&z, &expected) in fixture.waist_sweep_z_cm.iter().zip(&row.diameters_cm) {
            assert_relative_eq!(diameter(&result, z), expected, max_relative = TOLERANCE);
        }
    }
}
