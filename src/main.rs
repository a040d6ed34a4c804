mod bake;
mod runtime;
mod workload;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use navcache_recast::MeshComparison;
use navcache_tiles::{CacheSettings, NavMeshTilesCache};

use crate::bake::SyntheticBaker;
use crate::runtime::{RunReport, Runtime};
use crate::workload::{Workload, WorkloadConfig};

#[derive(Parser, Debug)]
#[command(
    name = "navcache",
    version,
    about = "Drive the navmesh tile cache with concurrent synthetic bakes"
)]
struct Args {
    /// TOML file with cache settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Cache budget in bytes (overrides the config file)
    #[arg(long)]
    max_size: Option<usize>,
    /// Compare snapshots structurally instead of trusting version stamps
    #[arg(long, default_value_t = false)]
    structural: bool,
    #[arg(long, default_value_t = 4)]
    workers: usize,
    #[arg(long, default_value_t = 2)]
    agents: usize,
    /// Side of the square tile grid
    #[arg(long, default_value_t = 16)]
    tiles: i32,
    /// Geometry variants per tile
    #[arg(long, default_value_t = 3)]
    variants: usize,
    #[arg(long, default_value_t = 20_000)]
    jobs: usize,
    /// Triangles per geometry snapshot
    #[arg(long, default_value_t = 256)]
    mesh_size: usize,
    /// Extra passes over the geometry per bake
    #[arg(long, default_value_t = 8)]
    bake_passes: u32,
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
}

fn load_settings(args: &Args) -> Result<CacheSettings, Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => CacheSettings::from_path(path)?,
        None => CacheSettings::default(),
    };
    if let Some(max_size) = args.max_size {
        settings.max_tiles_cache_size = max_size;
    }
    if args.structural {
        settings.mesh_comparison = MeshComparison::Structural;
    }
    Ok(settings)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let settings = load_settings(&args)?;
    log::info!(
        "cache budget {} bytes, {:?} comparison",
        settings.max_tiles_cache_size,
        settings.mesh_comparison
    );

    let t0 = Instant::now();
    let workload = Workload::generate(&WorkloadConfig {
        agents: args.agents,
        tiles: args.tiles,
        variants: args.variants,
        jobs: args.jobs,
        mesh_size: args.mesh_size,
        seed: args.seed,
    });
    log::info!(
        "workload: {} jobs, {} snapshots, {} agent(s) in {:?}",
        workload.jobs.len(),
        workload.snapshots.len(),
        workload.agents.len(),
        t0.elapsed()
    );

    let cache = Arc::new(NavMeshTilesCache::with_settings(&settings));
    let runtime = Runtime::new(
        Arc::clone(&cache),
        Arc::new(SyntheticBaker::new(args.bake_passes)),
        args.workers,
    )?;

    let total = workload.jobs.len();
    let t_run = Instant::now();
    for job in workload.jobs {
        runtime.submit(job);
    }

    let mut report = RunReport::default();
    let mut last_progress = Instant::now();
    while report.jobs < total {
        let Some(out) = runtime.recv_result() else {
            log::warn!("workers stopped after {} of {} jobs", report.jobs, total);
            break;
        };
        report.record(&out);
        for out in runtime.drain_results(256) {
            report.record(&out);
        }
        if last_progress.elapsed() >= Duration::from_secs(1) {
            let (queued, inflight) = runtime.queue_debug_counts();
            log::info!(
                "{}/{} done, queued={} inflight={} entries={}",
                report.jobs,
                total,
                queued,
                inflight,
                cache.len()
            );
            last_progress = Instant::now();
        }
    }

    println!("{report} wall={:?} workers={}", t_run.elapsed(), runtime.workers);
    let stats = cache.stats();
    println!("{stats}");
    stats.log_summary();
    Ok(())
}
