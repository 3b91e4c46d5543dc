//! terrain-erosion CLI - procedural terrain generator.
//!
//! Generates a noise heightmap, erodes it with simulated droplets, slices it
//! into chunks and exports the result.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use terrain_erosion::export::{export_grid_png, export_grid_raw, expected_file_size, PngExportOptions, RawFormat};
use terrain_erosion::{Terrain, TerrainConfig};

/// Procedural terrain generator with hydraulic erosion.
#[derive(Parser)]
#[command(name = "terrain-erosion")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, erode and export a terrain.
    Generate(GenerateArgs),

    /// Display memory and file size estimates for a terrain size.
    Info {
        /// Grid side length in cells.
        #[arg(short, long, default_value = "256")]
        size: usize,

        /// Chunk side length in cells.
        #[arg(short, long, default_value = "32")]
        chunk_size: usize,

        /// Erosion brush radius in cells.
        #[arg(short, long, default_value = "3")]
        radius: usize,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// TOML configuration file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid side length in cells.
    #[arg(long)]
    size: Option<usize>,

    /// Seed for both noise and droplet spawning.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of noise octaves.
    #[arg(long)]
    octaves: Option<u32>,

    /// Number of erosion droplets (0 disables erosion).
    #[arg(short, long)]
    droplets: Option<u32>,

    /// Chunk side length in cells.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "terrain")]
    name: String,

    /// Export format.
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Write the effective configuration to this TOML file.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info {
            size,
            chunk_size,
            radius,
        } => run_info(size, chunk_size, radius),
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Error {}: {}", context, err);
    std::process::exit(1);
}

/// Folds a 64-bit seed into the noise generator's 32-bit seed so every bit
/// of it affects the terrain.
fn noise_seed(seed: u64) -> i32 {
    ((seed >> 32) as u32 ^ seed as u32) as i32
}

fn effective_config(args: &GenerateArgs) -> TerrainConfig {
    let mut config = match &args.config {
        Some(path) => TerrainConfig::load(path).unwrap_or_else(|e| fail("loading config", e)),
        None => TerrainConfig::default(),
    };

    if let Some(size) = args.size {
        config.width = size;
        config.height = size;
    }
    if let Some(seed) = args.seed {
        config.noise.seed = noise_seed(seed);
        config.erosion.seed = seed;
    }
    if let Some(octaves) = args.octaves {
        config.noise.octaves = octaves;
    }
    if let Some(droplets) = args.droplets {
        config.erosion.droplet_count = droplets;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    config
}

fn run_generate(args: GenerateArgs) {
    let config = effective_config(&args);
    config.validate().unwrap_or_else(|e| fail("in configuration", e));

    println!("terrain-erosion - Procedural Terrain Generator");
    println!("==============================================");
    println!("Grid: {}x{} cells", config.width, config.height);
    println!("Noise seed: {}  Erosion seed: {}", config.noise.seed, config.erosion.seed);
    println!("Droplets: {}", config.erosion.droplet_count);
    println!("Output: {}", args.output.display());

    if let Some(path) = &args.save_config {
        config.save(path).unwrap_or_else(|e| fail("saving config", e));
        println!("Saved configuration to {}", path.display());
    }

    let start = Instant::now();
    let mut terrain = Terrain::new(&config).unwrap_or_else(|e| fail("creating terrain", e));

    println!("\nGenerating...");
    let stats = terrain
        .regenerate()
        .unwrap_or_else(|e| fail("during generation", e));
    println!("Generation completed in {:.2?}", start.elapsed());

    let (min_h, max_h) = terrain.grid().height_range();
    let triangles: usize = terrain.chunks().values().map(|c| c.triangle_count()).sum();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);
    println!("Chunks: {} ({} triangles)", terrain.chunks().len(), triangles);
    if stats.droplets > 0 {
        println!(
            "Erosion: {} droplets, {} steps, {} left the grid early",
            stats.droplets, stats.steps, stats.terminated_early
        );
        println!(
            "  Eroded {:.3}, deposited {:.3}",
            stats.total_eroded, stats.total_deposited
        );
    } else {
        println!("Erosion: SKIPPED");
    }

    println!("\nExporting heightmap...");
    let export_start = Instant::now();
    std::fs::create_dir_all(&args.output).unwrap_or_else(|e| fail("creating output directory", e));
    export(&terrain, &args.output, &args.name, args.format);

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn export(terrain: &Terrain, output: &Path, name: &str, format: ExportFormat) {
    let grid = terrain.grid();
    let options = PngExportOptions::auto_range(grid);
    let (min_h, max_h) = (options.min_height, options.max_height);

    match format {
        ExportFormat::Png => {
            let path = output.join(format!("{}.png", name));
            export_grid_png(grid, &path, &options).unwrap_or_else(|e| fail("exporting PNG", e));
            println!("  Exported {}", path.display());
        }
        ExportFormat::Raw => {
            let path = output.join(format!("{}.raw", name));
            export_grid_raw(grid, &path, RawFormat::R16LittleEndian, min_h, max_h)
                .unwrap_or_else(|e| fail("exporting RAW", e));
            println!("  Exported {} (R16, range [{:.4}, {:.4}])", path.display(), min_h, max_h);
        }
        ExportFormat::RawFloat => {
            let path = output.join(format!("{}.raw", name));
            export_grid_raw(grid, &path, RawFormat::R32Float, min_h, max_h)
                .unwrap_or_else(|e| fail("exporting RAW", e));
            println!("  Exported {} (R32 float)", path.display());
        }
    }
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn run_info(size: usize, chunk_size: usize, radius: usize) {
    if size == 0 || chunk_size == 0 || radius == 0 {
        fail("in arguments", "size, chunk size and radius must be > 0");
    }

    let cells = (size * size) as u64;
    let chunks_per_side = size.div_ceil(chunk_size) as u64;
    let chunks = chunks_per_side * chunks_per_side;
    let vertices_per_chunk = ((chunk_size + 1) * (chunk_size + 1)) as u64;
    let indices = (chunk_size * chunk_size * 6) as u64;

    let r = radius as i64;
    let kernel = (-r + 1..r)
        .flat_map(|dy| (-r + 1..r).map(move |dx| dx * dx + dy * dy))
        .filter(|&d| d < r * r)
        .count() as u64;
    let interior = size.saturating_sub(2 * radius) as u64;

    let bytes_heights = cells * 4;
    let bytes_vertices = chunks * vertices_per_chunk * 32;
    let bytes_indices = indices * 4;
    let bytes_brush = interior * interior * kernel * 8;

    println!("terrain-erosion - Terrain Size Info");
    println!("===================================");
    println!();
    println!("Grid: {}x{} ({} cells)", size, size, cells);
    println!("Chunks: {} x {} = {} (size {})", chunks_per_side, chunks_per_side, chunks, chunk_size);
    println!("  Vertices per chunk:  {:>10}", vertices_per_chunk);
    println!("  Triangles per chunk: {:>10}", indices / 3);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:         {:>12} bytes ({:.2} MB)", bytes_heights, megabytes(bytes_heights));
    println!("  Chunk vertices:  {:>12} bytes ({:.2} MB)", bytes_vertices, megabytes(bytes_vertices));
    println!("  Shared indices:  {:>12} bytes ({:.2} MB)", bytes_indices, megabytes(bytes_indices));
    println!("  Erosion brush:   {:>12} bytes ({:.2} MB, radius {})", bytes_brush, megabytes(bytes_brush), radius);
    let total = bytes_heights + bytes_vertices + bytes_indices + bytes_brush;
    println!("  Total:           {:>12} bytes ({:.2} MB)", total, megabytes(total));
    println!();
    println!("Export file sizes:");
    let r16 = expected_file_size(size, size, RawFormat::R16LittleEndian);
    let r32 = expected_file_size(size, size, RawFormat::R32Float);
    println!("  PNG (16-bit, raw): {:>10} bytes ({:.2} MB)", r16, megabytes(r16));
    println!("  RAW (R16):         {:>10} bytes ({:.2} MB)", r16, megabytes(r16));
    println!("  RAW (R32):         {:>10} bytes ({:.2} MB)", r32, megabytes(r32));
}
