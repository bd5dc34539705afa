//! Job runner: builds the core request, propagates, and writes profiles.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use gbp_core::sweep::sweep_waist_positions;
use gbp_core::units::{Length, LengthUnit};
use gbp_core::{BeamPropagator, BeamSample, PropagationEngine, SegmentedBeam, WidthConvention};

use crate::config::JobConfig;

/// Results from a single run.
pub struct RunOutput {
    pub beam: SegmentedBeam,
    pub samples: Vec<BeamSample>,
}

/// Results from a waist-position sweep: one column of widths per waist position.
pub struct SweepOutput {
    pub waist_positions: Vec<Length>,
    pub z: Vec<Length>,
    pub widths: Vec<Vec<f64>>,
}

/// Propagate the configured beam and sample it over the evaluation points.
pub fn run_job(job: &JobConfig) -> Result<RunOutput> {
    let descriptor = job.descriptor().context("Invalid beam description")?;
    let system = job.system().context("Invalid optical system")?;
    let range = job.range().context("Invalid evaluation points")?;
    let positions = job.positions().context("Invalid evaluation points")?;
    let media = job.media().context("Invalid media stack")?;
    log::debug!("Beam descriptor: {:?}", descriptor);

    let engine = PropagationEngine::new();
    println!("Method: {}", engine.method_name());
    println!("Elements: {}", system.len());
    if !media.is_empty() {
        println!("Media boundaries: {}", media.boundaries().len());
    }

    let beam = engine.propagate(&descriptor, &system, range)?.with_media(media);
    for (i, segment) in beam.segments().iter().enumerate() {
        println!(
            "  Segment {}: [{}, {}) cm, n={}, waist at {:.6} cm, w0={:.4e} cm",
            i,
            segment.z_start,
            segment.z_end,
            segment.n(),
            segment.waist_position(),
            segment.waist_radius()
        );
    }
    for waist in beam.waists() {
        println!(
            "Waist: z={:.6} cm, w0={:.4e} cm",
            waist.position.as_cm(),
            waist.radius.as_cm()
        );
    }

    let samples = positions
        .iter()
        .map(|&z| beam.sample_at(z))
        .collect::<Result<Vec<_>, _>>()?;
    println!("Sampled {} points over [{}, {}]", samples.len(), range.min(), range.max());
    Ok(RunOutput { beam, samples })
}

/// Propagate once per waist position and tabulate the configured width.
pub fn run_sweep(job: &JobConfig, positions: &[String]) -> Result<SweepOutput> {
    let descriptor = job.descriptor().context("Invalid beam description")?;
    let system = job.system().context("Invalid optical system")?;
    let range = job.range().context("Invalid evaluation points")?;
    let z = job.positions().context("Invalid evaluation points")?;
    let convention = job.output.width_convention()?;

    let waist_positions = positions
        .iter()
        .map(|p| {
            Length::parse_with_default(p, LengthUnit::Centimetre)
                .with_context(|| format!("Invalid waist position '{}'", p))
        })
        .collect::<Result<Vec<_>>>()?;
    if waist_positions.is_empty() {
        anyhow::bail!("No waist positions given");
    }

    let results = sweep_waist_positions(
        &PropagationEngine::new(),
        &descriptor,
        &system,
        range,
        &waist_positions,
    );

    let mut widths = Vec::with_capacity(results.len());
    for (z_w, result) in waist_positions.iter().zip(results) {
        let beam = result.with_context(|| format!("Propagation failed for waist at {}", z_w))?;
        let column = z
            .iter()
            .map(|&z| beam.width_at(z, convention).map(|w| w.as_cm()))
            .collect::<Result<Vec<_>, _>>()?;
        println!("  Waist at {}: {} points", z_w, column.len());
        widths.push(column);
    }

    Ok(SweepOutput { waist_positions, z, widths })
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn write_header(file: &mut impl Write, title: &str, job: &JobConfig) -> Result<()> {
    writeln!(file, "# gbp Gaussian Beam Propagator: {}", title)?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# wavelength: {:?}", job.beam.wavelength)?;
    writeln!(file, "# m_squared: {}", job.beam.m_squared)?;
    writeln!(file, "# refractive_index: {}", job.beam.refractive_index)?;
    for element in &job.optical_system.elements {
        writeln!(file, "# element: {:?}", element)?;
    }
    if let Some(background) = &job.media_stack.background {
        writeln!(file, "# background medium: {:?}", background)?;
    }
    for layer in &job.media_stack.layers {
        writeln!(file, "# layer: {:?}", layer)?;
    }
    writeln!(file, "#")?;
    Ok(())
}

/// Write the sampled profile to a CSV file with a metadata header.
pub fn write_profile_csv(
    samples: &[BeamSample],
    path: &Path,
    job: &JobConfig,
    convention: WidthConvention,
) -> Result<()> {
    create_parent(path)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    write_header(&mut file, "Beam Profile", job)?;
    let has_power = samples.iter().any(|s| s.peak_irradiance_w_per_cm2.is_some());
    write!(
        file,
        "z_cm,diameter_cm,radius_of_curvature_cm,divergence_rad,refractive_index,width_cm[{}]",
        convention.label()
    )?;
    if has_power {
        write!(file, ",peak_irradiance_w_per_cm2")?;
    }
    writeln!(file)?;

    for s in samples {
        write!(
            file,
            "{:.6},{:.6e},{:.6e},{:.6e},{},{:.6e}",
            s.z_cm,
            s.diameter_cm,
            s.radius_of_curvature_cm,
            s.divergence_rad,
            s.refractive_index,
            s.radius_cm * convention.factor()
        )?;
        if let Some(e) = s.peak_irradiance_w_per_cm2 {
            write!(file, ",{:.6e}", e)?;
        }
        writeln!(file)?;
    }

    println!("Profile written to: {}", path.display());
    Ok(())
}

/// Write the sampled profile to a JSON file.
pub fn write_profile_json(samples: &[BeamSample], path: &Path) -> Result<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(samples)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Profile (JSON) written to: {}", path.display());
    Ok(())
}

/// Write a waist-position sweep as one CSV column per waist position.
pub fn write_sweep_csv(
    sweep: &SweepOutput,
    path: &Path,
    job: &JobConfig,
    convention: WidthConvention,
) -> Result<()> {
    create_parent(path)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    write_header(&mut file, "Waist Position Sweep", job)?;
    writeln!(file, "# width: {} (cm)", convention.label())?;
    write!(file, "z_cm")?;
    for z_w in &sweep.waist_positions {
        write!(file, ",waist_at_{}cm", z_w.as_cm())?;
    }
    writeln!(file)?;

    for (i, z) in sweep.z.iter().enumerate() {
        write!(file, "{:.6}", z.as_cm())?;
        for column in &sweep.widths {
            write!(file, ",{:.6e}", column[i])?;
        }
        writeln!(file)?;
    }

    println!("Sweep written to: {}", path.display());
    Ok(())
}
