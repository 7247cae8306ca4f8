//! geopair CLI - polygon normalization and pairwise overlay

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geopair_algorithms::fixture::sample_collection;
use geopair_algorithms::pipeline::{
    differences, intersections, only_polygons, run_pipeline, PipelineParams,
};
use geopair_algorithms::vector::{BufferParams, ErrorPolicy, NormalizeParams, RelationParams};
use geopair_core::io::{read_geojson, write_geojson};
use geopair_core::{FeatureCollection, ShapeCollection};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "geopair")]
#[command(author, version, about = "Polygon normalization and pairwise overlay", long_about = None)]
struct Cli {
    /// Input GeoJSON file
    #[arg(long, global = true, default_value = "test.geojson")]
    config_path: PathBuf,

    /// Output GeoJSON file
    #[arg(long, global = true, default_value = "output.geojson")]
    output_path: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Keep only Polygon features (the default)
    Filter,
    /// Explode multipolygons and buffer points into polygons
    Normalize {
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Intersections of every intersecting pair
    Intersections {
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Differences of every intersecting pair
    Differences {
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Run all three stages and write task1/task2/task3.geojson
    Pipeline {
        /// Directory receiving the stage outputs
        #[arg(long, default_value = "./geojsons")]
        output_dir: PathBuf,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Write the sample dataset to the input path
    Fixture,
    /// Show information about a GeoJSON file
    Info,
}

#[derive(Args, Debug, Clone, PartialEq)]
struct ParamArgs {
    /// Radius used to buffer points
    #[arg(long, default_value = "0.01")]
    buffer_radius: f64,

    /// Segments per quarter circle of a buffered point
    #[arg(long, default_value = "16")]
    quadrant_segments: usize,

    /// Largest distance still counted as intersecting
    #[arg(long, default_value = "1e-9")]
    tolerance: f64,

    /// Skip pairs that cannot be overlaid instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Write empty overlay results as features without geometry
    #[arg(long)]
    keep_empty: bool,
}

impl ParamArgs {
    fn to_params(&self) -> PipelineParams {
        PipelineParams {
            normalize: NormalizeParams {
                buffer: BufferParams {
                    distance: self.buffer_radius,
                    quadrant_segments: self.quadrant_segments,
                },
            },
            relation: RelationParams {
                tolerance: self.tolerance,
            },
            on_error: if self.skip_invalid {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::Abort
            },
            keep_empty: self.keep_empty,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set default subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_input(path: &Path) -> Result<FeatureCollection> {
    let pb = spinner("Reading input...");
    let result = read_geojson(path);
    pb.finish_and_clear();
    let fc = result.with_context(|| format!("Invalid input file: {}", path.display()))?;
    info!("Input: {} features, CRS {}", fc.len(), fc.crs);
    Ok(fc)
}

fn read_shapes(path: &Path) -> Result<ShapeCollection> {
    let fc = read_input(path)?;
    ShapeCollection::from_features(&fc)
        .with_context(|| format!("Invalid input file: {}", path.display()))
}

fn write_output(fc: &FeatureCollection, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    let result = write_geojson(fc, path);
    pb.finish_and_clear();
    result.with_context(|| format!("Failed to write {}", path.display()))
}

fn done(name: &str, count: usize, path: &Path, elapsed: std::time::Duration) {
    println!("{} ({} features) saved to: {}", name, count, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let input = cli.config_path.as_path();
    let output = cli.output_path.as_path();

    match cli.command.unwrap_or(Commands::Filter) {
        Commands::Filter => {
            let mut fc = read_input(input)?;
            let start = Instant::now();
            fc.retain_kind("Polygon");
            let elapsed = start.elapsed();
            write_output(&fc, output)?;
            done("Polygons", fc.len(), output, elapsed);
        }

        Commands::Normalize { params } => {
            let shapes = read_shapes(input)?;
            let start = Instant::now();
            let fc = only_polygons(&shapes, &params.to_params())
                .context("Failed to normalize geometries")?;
            let elapsed = start.elapsed();
            write_output(&fc, output)?;
            done("Polygons", fc.len(), output, elapsed);
        }

        Commands::Intersections { params } => {
            let shapes = read_shapes(input)?;
            let start = Instant::now();
            let fc = intersections(&shapes, &params.to_params())
                .context("Failed to compute intersections")?;
            let elapsed = start.elapsed();
            write_output(&fc, output)?;
            done("Intersections", fc.len(), output, elapsed);
        }

        Commands::Differences { params } => {
            let shapes = read_shapes(input)?;
            let start = Instant::now();
            let fc = differences(&shapes, &params.to_params())
                .context("Failed to compute differences")?;
            let elapsed = start.elapsed();
            write_output(&fc, output)?;
            done("Differences", fc.len(), output, elapsed);
        }

        Commands::Pipeline { output_dir, params } => {
            let shapes = read_shapes(input)?;
            let start = Instant::now();
            let out = run_pipeline(&shapes, &params.to_params()).context("Pipeline failed")?;
            let elapsed = start.elapsed();

            let stages = [
                ("Task 1 (polygons)", "task1.geojson", out.polygon_features()),
                ("Task 2 (intersections)", "task2.geojson", out.intersections),
                ("Task 3 (differences)", "task3.geojson", out.differences),
            ];
            for (name, file, fc) in &stages {
                let path = output_dir.join(file);
                write_output(fc, &path)?;
                println!("{} ({} features) saved to: {}", name, fc.len(), path.display());
            }
            println!("  Intersecting pairs: {}", out.relation.len());
            println!("  Processing time: {:.2?}", elapsed);
        }

        Commands::Fixture => {
            let fc = sample_collection().to_features();
            write_output(&fc, input)?;
            println!("Sample dataset ({} features) saved to: {}", fc.len(), input.display());
        }

        Commands::Info => {
            let fc = read_input(input)?;
            println!("File: {}", input.display());
            println!("CRS: {}", fc.crs);
            println!("Features: {}", fc.len());
            for (kind, count) in fc.count_by_kind() {
                println!("  {}: {}", kind, count);
            }
        }
    }

    Ok(())
}
