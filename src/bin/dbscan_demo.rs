//! Synthetic-data demo: generates clustered spatiotemporal points, runs the
//! clustering pipeline, and optionally exports `x,y,label` CSV rows for
//! plotting.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use grid_dbscan::{cluster_with, ClusterOutput, DbscanParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Parallel grid DBSCAN over synthetic spatiotemporal data
#[derive(Parser, Debug)]
#[command(name = "dbscan-demo", version, about)]
struct Cli {
    /// Total generated points (half clustered, half uniform noise)
    #[arg(long, default_value_t = 100_000)]
    points: usize,

    /// Neighborhood half-width along x (space)
    #[arg(long, default_value_t = 0.6)]
    eps_space: f32,

    /// Neighborhood half-width along y (time)
    #[arg(long, default_value_t = 0.6)]
    eps_time: f32,

    /// Minimum neighbors for a core point
    #[arg(long, default_value_t = 100)]
    min_pts: u32,

    /// Worker threads (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Random seed for data generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Export points and labels as CSV
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

/// Three Gaussian clumps at distinct locations and times, plus uniform
/// noise over the whole domain.
fn generate(n: usize, seed: u64) -> Vec<[f32; 2]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let space_dist = Normal::new(0.0f32, 5.0).expect("valid sigma");
    let time_dist = Normal::new(0.0f32, 2.0).expect("valid sigma");

    let centers = [[0.0f32, 10.0], [50.0, 50.0], [100.0, 90.0]];

    let n_noise = n / 2;
    let n_clustered = n - n_noise;

    let mut points = Vec::with_capacity(n);
    for i in 0..n_clustered {
        let center = centers[i % centers.len()];
        points.push([
            center[0] + space_dist.sample(&mut rng),
            center[1] + time_dist.sample(&mut rng),
        ]);
    }
    for _ in 0..n_noise {
        points.push([
            rng.gen_range(-20.0f32..120.0),
            rng.gen_range(-10.0f32..110.0),
        ]);
    }
    points
}

fn export_csv(path: &Path, points: &[[f32; 2]], labels: &[i32]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for (p, label) in points.iter().zip(labels) {
        writeln!(file, "{},{},{}", p[0], p[1], label)?;
    }
    file.flush()
}

fn print_summary(output: &ClusterOutput, elapsed_ms: f64) {
    println!("clustering took {:.2} ms", elapsed_ms);
    println!("clusters: {}", output.num_clusters);
    println!("noise points: {}", output.num_noise);
    for (id, size) in output.cluster_sizes().iter().enumerate() {
        println!("  cluster {}: {} points", id, size);
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!(
        "generating {} points (seed {}), eps=({}, {}), min_pts={}",
        cli.points, cli.seed, cli.eps_space, cli.eps_time, cli.min_pts
    );
    let points = generate(cli.points, cli.seed);

    let mut params = DbscanParams::new([cli.eps_space, cli.eps_time], cli.min_pts);
    if let Some(threads) = cli.threads {
        params = params.with_threads(threads);
    }

    let start = Instant::now();
    let output = match cluster_with(&points, &params) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("clustering failed: {}", e);
            std::process::exit(1);
        }
    };
    print_summary(&output, start.elapsed().as_secs_f64() * 1000.0);

    if let Some(path) = cli.export {
        match export_csv(&path, &points, &output.labels) {
            Ok(()) => println!("exported results to {}", path.display()),
            Err(e) => {
                eprintln!("export to {} failed: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
