// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshbridge CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use meshbridge::{
    io, BoundingBox, BoundingRegion, BridgeConfig, CentroidKind, DiagnosticsReport, EngineKind, Kernel, Timed,
};
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshbridge")]
#[command(about = "Geometry queries on STL meshes through a native engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./meshbridge.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Native engine shared library; selects the dynamic engine
    #[arg(long, global = true, value_name = "PATH")]
    library: Option<PathBuf>,

    /// Print timing for each native operation
    #[arg(long, global = true)]
    timing: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enclosed volume of a closed mesh
    Volume {
        /// Input STL file
        input: PathBuf,
    },

    /// Centroid of a mesh
    Centroid {
        /// Input STL file
        input: PathBuf,

        /// Estimator to use
        #[arg(short, long, value_enum, default_value = "vertex")]
        kind: KindArg,
    },

    /// Test whether a point lies inside a mesh (surface points count as inside)
    #[command(allow_negative_numbers = true)]
    Contains {
        /// Input STL file
        input: PathBuf,
        x: f64,
        y: f64,
        z: f64,
    },

    /// Faces inside a box or sphere
    QueryFaces {
        /// Input STL file
        input: PathBuf,

        #[command(flatten)]
        region: RegionArgs,

        /// Write matched faces to an STL file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Vertices inside a box or sphere
    QueryVertices {
        /// Input STL file
        input: PathBuf,

        #[command(flatten)]
        region: RegionArgs,
    },

    /// Convex hull of the mesh vertices
    Hull {
        /// Input STL file
        input: PathBuf,

        /// Write the hull to an STL file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep the part of a mesh behind a plane
    #[command(allow_negative_numbers = true)]
    Clip {
        /// Input STL file
        input: PathBuf,

        /// Point on the plane
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
        point: Vec<f64>,

        /// Plane normal; the side it points to is removed
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
        normal: Vec<f64>,

        /// Output STL file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Closest surface point within a search distance
    #[command(allow_negative_numbers = true)]
    Closest {
        /// Input STL file
        input: PathBuf,
        x: f64,
        y: f64,
        z: f64,

        /// Maximum search distance
        #[arg(short, long, default_value_t = f64::MAX)]
        distance: f64,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct RegionArgs {
    /// Axis-aligned box
    #[arg(long = "box", num_args = 6, allow_negative_numbers = true,
          value_names = ["MINX", "MINY", "MINZ", "MAXX", "MAXY", "MAXZ"])]
    bbox: Option<Vec<f64>>,

    /// Sphere
    #[arg(long, num_args = 4, allow_negative_numbers = true, value_names = ["CX", "CY", "CZ", "R"])]
    sphere: Option<Vec<f64>>,
}

impl RegionArgs {
    fn region(&self) -> Result<BoundingRegion> {
        match (&self.bbox, &self.sphere) {
            (Some(b), None) => {
                let bounds: [f64; 6] = b.as_slice().try_into().context("--box takes 6 values")?;
                Ok(BoundingBox::from_array(bounds).into())
            }
            (None, Some(s)) => {
                let [cx, cy, cz, r]: [f64; 4] = s.as_slice().try_into().context("--sphere takes 4 values")?;
                Ok(BoundingRegion::sphere(Point3::new(cx, cy, cz), r))
            }
            _ => anyhow::bail!("exactly one of --box or --sphere is required"),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Vertex,
    Area,
    Volume,
}

impl From<KindArg> for CentroidKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Vertex => CentroidKind::VertexBased,
            KindArg::Area => CentroidKind::AreaBased,
            KindArg::Volume => CentroidKind::VolumeBased,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Version = cli.command {
        println!("Meshbridge v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&cli)?;
    let kernel = Kernel::from_config(&config).context("Failed to initialize native engine")?;
    let mut report = DiagnosticsReport::new();

    if cli.verbose {
        println!(
            "{} {} engine (reentrant: {})",
            "ℹ".bright_blue(),
            kernel.engine().kind(),
            kernel.engine().is_reentrant()
        );
    }

    run(&cli.command, &kernel, &mut report)?;

    if config.timing && !report.is_empty() {
        report.print_report();
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "meshbridge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)?.with_env_overrides()?,
        None => BridgeConfig::load()?,
    };
    if let Some(library) = &cli.library {
        config.library_path = Some(library.clone());
        config.engine = EngineKind::Dynamic;
    }
    config.timing |= cli.timing;
    Ok(config)
}

fn load(input: &Path) -> Result<meshbridge::Mesh> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    io::load_stl(input)
}

fn point(values: &[f64]) -> Result<[f64; 3]> {
    values.try_into().context("expected 3 values")
}

fn run(command: &Commands, kernel: &Kernel, report: &mut DiagnosticsReport) -> Result<()> {
    match command {
        Commands::Volume { input } => {
            let mesh = load(input)?;
            let volume = report.track("volume", Timed::measure(|| kernel.volume(&mesh)))?;
            println!("{} {}", "Volume:".bold(), format!("{:.6}", volume).cyan());
        }
        Commands::Centroid { input, kind } => {
            let mesh = load(input)?;
            let kind = CentroidKind::from(*kind);
            let c = report.track("centroid", Timed::measure(|| kernel.centroid(&mesh, kind)))?;
            println!("{} ({:.6}, {:.6}, {:.6})", "Centroid:".bold(), c.x, c.y, c.z);
        }
        Commands::Contains { input, x, y, z } => {
            let mesh = load(input)?;
            let p = Point3::new(*x, *y, *z);
            let inside = report.track("contains", Timed::measure(|| kernel.contains_point(&mesh, &p)))?;
            if inside {
                println!("{} point is inside", "✓".green());
            } else {
                println!("{} point is outside", "✗".red());
            }
        }
        Commands::QueryFaces { input, region, output } => {
            let mesh = load(input)?;
            let region = region.region()?;
            let faces = report.track("query_faces", Timed::measure(|| kernel.query_faces(&mesh, &region)))?;
            println!("{} {}", "Matched faces:".bold(), faces.face_count().to_string().cyan());
            if let Some(output) = output {
                io::export_stl(&faces, output)?;
                println!("  {} {}", "Output:".bright_black(), output.display());
            }
        }
        Commands::QueryVertices { input, region } => {
            let mesh = load(input)?;
            let region = region.region()?;
            let points =
                report.track("query_vertices", Timed::measure(|| kernel.query_vertices(&mesh, &region)))?;
            println!("{} {}", "Matched vertices:".bold(), points.len().to_string().cyan());
            for p in points {
                println!("  ({:.6}, {:.6}, {:.6})", p.x, p.y, p.z);
            }
        }
        Commands::Hull { input, output } => {
            let mesh = load(input)?;
            let points: Vec<Point3<f64>> = mesh.positions().collect();
            let hull = kernel.convex_hull(&points)?;
            println!("{}", hull.summary("Convex hull").bright_black());
            let hull = report.track("convex_hull", hull);
            println!("{} {}", "Hull faces:".bold(), hull.face_count().to_string().cyan());
            if let Some(output) = output {
                io::export_stl(&hull, output)?;
                println!("  {} {}", "Output:".bright_black(), output.display());
            }
        }
        Commands::Clip { input, point: p, normal, output } => {
            let mesh = load(input)?;
            let [px, py, pz] = point(p)?;
            let [nx, ny, nz] = point(normal)?;
            let clipped = report.track(
                "clip_with_plane",
                Timed::measure(|| {
                    kernel.clip_with_plane(&mesh, &Point3::new(px, py, pz), &Vector3::new(nx, ny, nz))
                }),
            )?;
            io::export_stl(&clipped, output)?;
            println!(
                "{} {} faces -> {}",
                "✓".green(),
                clipped.face_count(),
                output.display().to_string().cyan()
            );
        }
        Commands::Closest { input, x, y, z, distance } => {
            let mesh = load(input)?;
            let p = Point3::new(*x, *y, *z);
            let found =
                report.track("closest_point", Timed::measure(|| kernel.closest_point(&mesh, &p, *distance)))?;
            match found {
                Some(c) => println!("{} ({:.6}, {:.6}, {:.6})", "Closest:".bold(), c.x, c.y, c.z),
                None => println!("{} no point within {}", "✗".red(), distance),
            }
        }
        Commands::Version => {}
    }
    Ok(())
}
