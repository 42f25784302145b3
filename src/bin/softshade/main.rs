//! Softshade CLI - inspect, weld and soft-shade triangle meshes.
//!
//! Usage: softshade <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `softshade --help` for available commands.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use softshade::algo::creases::crease_edges;
use softshade::algo::normals::DEFAULT_THRESHOLD_DEGREES;
use softshade::algo::{NormalOptions, ShadingMode};
use softshade::geometry::SoftShadingGeometry;
use softshade::io;
use softshade::mesh::{build_from_soup, build_from_soup_with_stats, LoadOptions, DEFAULT_MERGE_DISTANCE};

#[derive(Parser)]
#[command(name = "softshade")]
#[command(author, version, about = "Crease-aware mesh shading CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh topology and crease statistics
    Info {
        /// Input mesh file (.stl or .ply)
        input: PathBuf,

        /// Crease threshold angle in degrees
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD_DEGREES)]
        angle: f64,

        /// Distance below which vertices are welded
        #[arg(short, long, default_value_t = DEFAULT_MERGE_DISTANCE)]
        merge_distance: f64,
    },

    /// Compute per-corner normals and write shaded geometry
    Shade {
        /// Input mesh file (.stl or .ply)
        input: PathBuf,

        /// Output file (.ply keeps the normals, .stl keeps positions only)
        output: PathBuf,

        /// Crease threshold angle in degrees
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD_DEGREES)]
        angle: f64,

        /// Shading mode
        #[arg(long, value_enum, default_value = "crease")]
        mode: Mode,

        /// Distance below which vertices are welded
        #[arg(short, long, default_value_t = DEFAULT_MERGE_DISTANCE)]
        merge_distance: f64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Weld duplicate vertices and write the indexed mesh
    Weld {
        /// Input mesh file (.stl or .ply)
        input: PathBuf,

        /// Output mesh file (.stl)
        output: PathBuf,

        /// Distance below which vertices are welded
        #[arg(short, long, default_value_t = DEFAULT_MERGE_DISTANCE)]
        merge_distance: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Smooth within regions bounded by crease edges
    Crease,
    /// Smooth across every edge
    Smooth,
    /// One normal per face
    Flat,
}

impl From<Mode> for ShadingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Crease => ShadingMode::Crease,
            Mode::Smooth => ShadingMode::Smooth,
            Mode::Flat => ShadingMode::Flat,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(level)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info {
            input,
            angle,
            merge_distance,
        } => {
            cmd_info(&input, angle, merge_distance)?;
        }

        Commands::Shade {
            input,
            output,
            angle,
            mode,
            merge_distance,
            sequential,
        } => {
            cmd_shade(&input, &output, angle, mode, merge_distance, sequential)?;
        }

        Commands::Weld {
            input,
            output,
            merge_distance,
        } => {
            cmd_weld(&input, &output, merge_distance)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &PathBuf, angle: f64, merge_distance: f64) -> Result<(), Box<dyn std::error::Error>> {
    let soup = io::load(input)?;

    let options = LoadOptions::default().with_merge_distance(merge_distance);
    let (mesh, stats) = build_from_soup_with_stats(&soup, &options)?;

    println!("File: {}", input.display());
    println!("Input positions: {}", stats.input_positions);
    println!("Input triangles: {}", soup.num_triangles());
    println!("Welded vertices: {}", stats.welded_positions);
    println!("Degenerate triangles dropped: {}", stats.dropped_triangles);
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    if mesh.is_closed() {
        println!("Topology: closed");
    } else {
        println!("Topology: open ({} boundary half-edges)", mesh.num_boundary_halfedges());
    }

    let creases = crease_edges(&mesh, angle.to_radians());
    println!("Crease edges above {:.1} deg: {}", angle, creases.len());

    Ok(())
}

fn cmd_shade(
    input: &PathBuf,
    output: &PathBuf,
    angle: f64,
    mode: Mode,
    merge_distance: f64,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let soup = io::load(input)?;
    println!("Loaded {} triangles", soup.num_triangles());

    let load_options = LoadOptions::default().with_merge_distance(merge_distance);
    let normal_options = NormalOptions::default()
        .with_threshold_degrees(angle)
        .with_parallel(!sequential);

    let start = Instant::now();
    let mut geometry = SoftShadingGeometry::new(&soup, load_options, normal_options)?;
    if mode != Mode::Crease {
        geometry.set_mode(mode.into())?;
    }
    let elapsed = start.elapsed();

    println!(
        "Shaded {} faces ({} vertices) in {:.2?}",
        geometry.mesh().num_faces(),
        geometry.mesh().num_vertices(),
        elapsed
    );

    io::save_shaded(geometry.buffers(), output)?;
    println!("Saved {} corners to {}", geometry.buffers().num_corners(), output.display());

    Ok(())
}

fn cmd_weld(input: &PathBuf, output: &PathBuf, merge_distance: f64) -> Result<(), Box<dyn std::error::Error>> {
    let soup = io::load(input)?;

    let options = LoadOptions::default().with_merge_distance(merge_distance);
    let mesh = build_from_soup(&soup, &options)?;
    println!(
        "Welded {} positions into {} vertices, {} faces",
        soup.positions.len(),
        mesh.num_vertices(),
        mesh.num_faces()
    );

    io::save(&mesh, output)?;
    println!("Saved to {}", output.display());

    Ok(())
}
