//! Job configuration deserialisation (TOML or JSON).
//!
//! Dimensional values may be bare numbers in a per-field default unit or
//! strings such as `"0.61 cm"` or `"5 mrad"`.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use gbp_core::units::{parse_power_watts, Angle, AngleUnit, Length, LengthUnit};
use gbp_core::{
    AxialRange, BeamDescriptor, BeamError, BeamResult, MediaStack, Medium, OpticalElement,
    OpticalSystem, WidthConvention,
};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub evaluation_points: EvaluationPoints,
    pub beam: BeamConfig,
    #[serde(default)]
    pub optical_system: OpticalSystemConfig,
    #[serde(default)]
    pub media_stack: MediaStackConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// A number in the field's default unit, or a `"<value> <unit>"` string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    pub fn length(&self, default_unit: LengthUnit) -> BeamResult<Length> {
        match self {
            Quantity::Number(v) => Ok(Length::new(*v, default_unit)),
            Quantity::Text(s) => Length::parse_with_default(s, default_unit),
        }
    }

    pub fn angle(&self, default_unit: AngleUnit) -> BeamResult<Angle> {
        match self {
            Quantity::Number(v) => Ok(Angle::new(*v, default_unit)),
            Quantity::Text(s) => Angle::parse_with_default(s, default_unit),
        }
    }

    pub fn watts(&self) -> BeamResult<f64> {
        match self {
            Quantity::Number(v) => Ok(*v),
            Quantity::Text(s) => parse_power_watts(s),
        }
    }
}

/// Where the beam is sampled for output.
#[derive(Debug, Deserialize)]
pub struct EvaluationPoints {
    pub z: AxisPoints,
}

/// `n` evenly spaced points over `[min, max]`, followed by any explicit
/// `points`. At least one of the two forms must be present.
#[derive(Debug, Deserialize)]
pub struct AxisPoints {
    #[serde(default)]
    pub min: Option<Quantity>,
    #[serde(default)]
    pub max: Option<Quantity>,
    #[serde(default = "default_points")]
    pub n: usize,
    #[serde(default)]
    pub points: Vec<Quantity>,
}

fn default_points() -> usize {
    100
}

impl AxisPoints {
    fn bounds(&self) -> BeamResult<Option<AxialRange>> {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => Ok(Some(AxialRange::new(
                min.length(LengthUnit::Centimetre)?,
                max.length(LengthUnit::Centimetre)?,
            )?)),
            (None, None) => Ok(None),
            _ => Err(BeamError::Configuration(
                "evaluation_points.z needs both min and max".into(),
            )),
        }
    }

    fn explicit(&self) -> BeamResult<Vec<Length>> {
        self.points
            .iter()
            .map(|p| {
                let z = p.length(LengthUnit::Centimetre)?;
                if z.is_finite() {
                    Ok(z)
                } else {
                    Err(BeamError::Configuration(format!("evaluation point {} is not finite", z)))
                }
            })
            .collect()
    }
}

/// Beam description from the job file.
#[derive(Debug, Deserialize)]
pub struct BeamConfig {
    /// Vacuum wavelength (default unit: nm).
    pub wavelength: Quantity,
    /// Beam power (default unit: W).
    #[serde(default)]
    pub power: Option<Quantity>,
    /// 1/e² half-angle divergence (default unit: mrad).
    #[serde(default)]
    pub divergence: Option<Quantity>,
    #[serde(default)]
    pub waist: WaistConfig,
    #[serde(default = "default_unity")]
    pub m_squared: f64,
    #[serde(default = "default_unity")]
    pub refractive_index: f64,
    /// Where `power` is measured (default unit: cm). Defaults to z = 0.
    #[serde(default)]
    pub power_position: Option<Quantity>,
    /// A measured diameter that places the waist instead of `waist.position`.
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

/// A 1/e² beam size measured at a position; give `diameter` or `radius`.
#[derive(Debug, Deserialize)]
pub struct ProfileConfig {
    /// Default unit: cm. Defaults to z = 0.
    #[serde(default)]
    pub position: Option<Quantity>,
    #[serde(default)]
    pub diameter: Option<Quantity>,
    #[serde(default)]
    pub radius: Option<Quantity>,
}

impl ProfileConfig {
    fn position(&self) -> BeamResult<Length> {
        match &self.position {
            Some(p) => p.length(LengthUnit::Centimetre),
            None => Ok(Length::cm(0.0)),
        }
    }

    fn diameter(&self) -> BeamResult<Length> {
        match (&self.diameter, &self.radius) {
            (Some(d), None) => d.length(LengthUnit::Centimetre),
            (None, Some(r)) => Ok(r.length(LengthUnit::Centimetre)? * 2.0),
            _ => Err(BeamError::Configuration(
                "a beam profile needs exactly one of diameter or radius".into(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WaistConfig {
    /// Default unit: cm. Defaults to z = 0.
    #[serde(default)]
    pub position: Option<Quantity>,
    /// 1/e² waist radius (default unit: cm).
    #[serde(default)]
    pub radius: Option<Quantity>,
}

fn default_unity() -> f64 {
    1.0
}

#[derive(Debug, Default, Deserialize)]
pub struct OpticalSystemConfig {
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

/// A single element; lengths default to cm.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ElementConfig {
    #[serde(rename = "Thin Lens")]
    ThinLens { position: Quantity, focal_length: Quantity },
    #[serde(rename = "Flat Interface")]
    FlatInterface { position: Quantity, refractive_index: IndexPair },
    #[serde(rename = "Spherical Interface")]
    SphericalInterface {
        position: Quantity,
        radius_of_curvature: Quantity,
        refractive_index: IndexPair,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IndexPair {
    pub initial: f64,
    #[serde(rename = "final")]
    pub final_: f64,
}

impl ElementConfig {
    pub fn position(&self) -> BeamResult<Length> {
        match self {
            ElementConfig::ThinLens { position, .. }
            | ElementConfig::FlatInterface { position, .. }
            | ElementConfig::SphericalInterface { position, .. } => {
                position.length(LengthUnit::Centimetre)
            }
        }
    }

    pub fn to_element(&self) -> BeamResult<OpticalElement> {
        match self {
            ElementConfig::ThinLens { focal_length, .. } => {
                OpticalElement::thin_lens(focal_length.length(LengthUnit::Centimetre)?)
            }
            ElementConfig::FlatInterface { refractive_index, .. } => {
                OpticalElement::flat_interface(refractive_index.initial, refractive_index.final_)
            }
            ElementConfig::SphericalInterface { radius_of_curvature, refractive_index, .. } => {
                OpticalElement::spherical_interface(
                    radius_of_curvature.length(LengthUnit::Centimetre)?,
                    refractive_index.initial,
                    refractive_index.final_,
                )
            }
        }
    }
}

/// Absorbing layers along the axis.
#[derive(Debug, Default, Deserialize)]
pub struct MediaStackConfig {
    /// Medium outside every layer (default: transparent).
    #[serde(default)]
    pub background: Option<MediumConfig>,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type")]
pub enum MediumConfig {
    #[serde(rename = "Transparent")]
    Transparent,
    /// `absorption_coefficient` in 1/cm.
    #[serde(rename = "Linear Absorber")]
    LinearAbsorber { absorption_coefficient: f64 },
}

impl MediumConfig {
    fn to_medium(self) -> BeamResult<Medium> {
        match self {
            MediumConfig::Transparent => Ok(Medium::Transparent),
            MediumConfig::LinearAbsorber { absorption_coefficient } => {
                Medium::linear_absorber(absorption_coefficient)
            }
        }
    }
}

/// One layer. Without `position` it starts where the previous layer ended
/// (or at z = 0); without `thickness` it runs up to the next layer.
#[derive(Debug, Deserialize)]
pub struct LayerConfig {
    #[serde(default)]
    pub position: Option<Quantity>,
    #[serde(default)]
    pub thickness: Option<Quantity>,
    #[serde(flatten)]
    pub medium: MediumConfig,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the beam profile as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save the profile as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
    /// Width convention of the extra CSV column, e.g. "fwhm diameter".
    #[serde(default)]
    pub width_convention: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
            width_convention: None,
        }
    }
}

impl OutputConfig {
    pub fn width_convention(&self) -> BeamResult<WidthConvention> {
        match &self.width_convention {
            Some(s) => s.parse(),
            None => Ok(WidthConvention::default()),
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    pub fn descriptor(&self) -> BeamResult<BeamDescriptor> {
        let beam = &self.beam;
        let mut descriptor = BeamDescriptor::new(beam.wavelength.length(LengthUnit::Nanometre)?)
            .with_m_squared(beam.m_squared)
            .with_refractive_index(beam.refractive_index);
        if let Some(position) = &beam.waist.position {
            descriptor = descriptor.with_waist_position(position.length(LengthUnit::Centimetre)?);
        }
        match beam.profiles.as_slice() {
            [] => {}
            [profile] => {
                if beam.waist.position.is_some() {
                    return Err(BeamError::Configuration(
                        "give either waist.position or a beam profile, not both".into(),
                    ));
                }
                descriptor = descriptor.with_profile(profile.position()?, profile.diameter()?);
            }
            _ => {
                return Err(BeamError::Configuration(format!(
                    "expected at most one beam profile, got {}",
                    beam.profiles.len()
                )))
            }
        }
        if let Some(radius) = &beam.waist.radius {
            descriptor = descriptor.with_waist_radius(radius.length(LengthUnit::Centimetre)?);
        }
        if let Some(divergence) = &beam.divergence {
            descriptor = descriptor.with_divergence(divergence.angle(AngleUnit::Milliradian)?);
        }
        if let Some(power) = &beam.power {
            descriptor = descriptor.with_power(power.watts()?);
        }
        if let Some(position) = &beam.power_position {
            descriptor = descriptor.with_power_position(position.length(LengthUnit::Centimetre)?);
        }
        Ok(descriptor)
    }

    pub fn system(&self) -> BeamResult<OpticalSystem> {
        let mut system = OpticalSystem::new();
        for element in &self.optical_system.elements {
            system.add(element.position()?, element.to_element()?)?;
        }
        system.finalize();
        Ok(system)
    }

    /// The smallest range holding every evaluation point.
    pub fn range(&self) -> BeamResult<AxialRange> {
        let z = &self.evaluation_points.z;
        let (mut lo, mut hi) = match z.bounds()? {
            Some(r) => (r.min().as_cm(), r.max().as_cm()),
            None => (f64::INFINITY, f64::NEG_INFINITY),
        };
        for p in z.explicit()? {
            lo = lo.min(p.as_cm());
            hi = hi.max(p.as_cm());
        }
        if lo > hi {
            return Err(BeamError::Configuration(
                "evaluation_points.z needs min and max, or a list of points".into(),
            ));
        }
        AxialRange::new(Length::cm(lo), Length::cm(hi))
    }

    /// Evaluation positions: the evenly spaced ones, then the explicit list.
    pub fn positions(&self) -> BeamResult<Vec<Length>> {
        let z = &self.evaluation_points.z;
        let mut positions = match z.bounds()? {
            Some(r) => r.linspace(z.n),
            None => Vec::new(),
        };
        positions.extend(z.explicit()?);
        Ok(positions)
    }

    pub fn media(&self) -> BeamResult<MediaStack> {
        let config = &self.media_stack;
        let background = match config.background {
            Some(m) => m.to_medium()?,
            None => Medium::Transparent,
        };
        let mut stack = MediaStack::new().with_background(background)?;
        let mut back: Option<Length> = None;
        for layer in &config.layers {
            let position = match &layer.position {
                Some(p) => Some(p.length(LengthUnit::Centimetre)?),
                None => None,
            };
            // An explicit front after a finite layer leaves background in between.
            if let (Some(_), Some(b)) = (position, back) {
                stack.add_boundary(b, background)?;
            }
            let front = position.or(back).unwrap_or(Length::cm(0.0));
            back = match &layer.thickness {
                Some(t) => {
                    let t = t.length(LengthUnit::Centimetre)?;
                    if !(t.is_finite() && t.as_cm() >= 0.0) {
                        return Err(BeamError::Configuration(format!(
                            "layer thickness must be non-negative and finite, got {}",
                            t
                        )));
                    }
                    Some(front + t)
                }
                None => None,
            };
            stack.add_boundary(front, layer.medium.to_medium()?)?;
        }
        if let Some(b) = back {
            stack.add_boundary(b, background)?;
        }
        Ok(stack)
    }

    /// Build every core input, so that a bad job fails before anything runs.
    pub fn validate(&self) -> BeamResult<()> {
        self.descriptor()?.resolve()?;
        self.system()?;
        self.range()?;
        self.positions()?;
        self.media()?;
        self.output.width_convention()?;
        Ok(())
    }
}

/// Load a job file; `.json` files are read as JSON, everything else as TOML.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON job file {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML job file {}", path.display()))?
    };
    Ok(config)
}
