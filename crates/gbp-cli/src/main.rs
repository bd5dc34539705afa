//! gbp command-line interface.
//!
//! Propagate Gaussian beams from TOML or JSON job files:
//! ```sh
//! gbp-cli run job.toml
//! gbp-cli validate job.toml
//! gbp-cli sweep job.toml --positions 9,0,-1,-10,-30,-100,-300
//! gbp-cli elements
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gbp-cli")]
#[command(about = "gbp: paraxial Gaussian beam propagation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate the beam described by a job file and write its profile.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a job file without propagating.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Repeat a job for several waist positions (default unit: cm).
    Sweep {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Comma-separated waist positions, e.g. `9,0,-10` or `"5 mm,1 cm"`.
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        positions: Vec<String>,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the supported optical element types.
    Elements,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("gbp Gaussian Beam Propagator");
            println!("============================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let convention = job.output.width_convention()?;
            let result = runner::run_job(&job)?;
            println!("Segments: {}", result.beam.segments().len());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                let csv_path = out_dir.join("profile.csv");
                runner::write_profile_csv(&result.samples, &csv_path, &job, convention)?;
            }

            if job.output.save_json {
                let json_path = out_dir.join("profile.json");
                runner::write_profile_json(&result.samples, &json_path)?;
            }

            println!("Propagation complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            job.validate()?;
            println!(
                "Configuration is valid: {} ({} elements)",
                config.display(),
                job.optical_system.elements.len()
            );
            Ok(())
        }
        Commands::Sweep { config, positions, output } => {
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());
            let convention = job.output.width_convention()?;
            let sweep = runner::run_sweep(&job, &positions)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            runner::write_sweep_csv(&sweep, &out_dir.join("sweep.csv"), &job, convention)?;
            println!("Sweep complete.");
            Ok(())
        }
        Commands::Elements => {
            println!("Supported optical elements (lengths default to cm):");
            println!();
            println!("  \"Thin Lens\"            position, focal_length");
            println!("  \"Flat Interface\"       position, refractive_index.{{initial, final}}");
            println!(
                "  \"Spherical Interface\"  position, radius_of_curvature, refractive_index.{{initial, final}}"
            );
            println!();
            println!("  A spherical interface has R > 0 when its centre of curvature lies downstream.");
            println!();
            println!("Media (media_stack.background, media_stack.layers[]):");
            println!();
            println!("  \"Linear Absorber\"      absorption_coefficient (1/cm), position, thickness");
            println!("  \"Transparent\"          position, thickness");
            Ok(())
        }
    }
}
