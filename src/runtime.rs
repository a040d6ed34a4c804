//! Bake workers sharing one tile cache.
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use navcache_geom::{AgentHalfExtents, TilePosition};
use navcache_recast::{PreparedNavMeshData, RecastMesh};
use navcache_tiles::NavMeshTilesCache;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::bake::TileBaker;

#[derive(Clone, Debug)]
pub struct BakeJob {
    pub job_id: u64,
    pub agent_half_extents: AgentHalfExtents,
    pub tile_position: TilePosition,
    pub recast_mesh: Arc<RecastMesh>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileSource {
    /// Served from the cache without baking.
    Cache,
    /// Baked by this job and offered to the cache.
    Baked,
    /// Nothing walkable; no tile produced.
    Empty,
}

pub struct JobOut {
    pub job_id: u64,
    pub tile_position: TilePosition,
    pub source: TileSource,
    pub data: Option<Arc<PreparedNavMeshData>>,
    pub t_total_us: u32,
    pub t_bake_us: u32,
}

fn elapsed_us(t0: Instant) -> u32 {
    t0.elapsed().as_micros().min(u128::from(u32::MAX)) as u32
}

fn process_bake_job(
    job: BakeJob,
    cache: &NavMeshTilesCache,
    baker: &dyn TileBaker,
    tx: &Sender<JobOut>,
) {
    let BakeJob {
        job_id,
        agent_half_extents,
        tile_position,
        recast_mesh,
    } = job;
    let t_job_start = Instant::now();

    if let Some(data) = cache.get(agent_half_extents, tile_position, &recast_mesh) {
        let _ = tx.send(JobOut {
            job_id,
            tile_position,
            source: TileSource::Cache,
            data: Some(data),
            t_total_us: elapsed_us(t_job_start),
            t_bake_us: 0,
        });
        return;
    }

    let t0 = Instant::now();
    let baked = baker.bake(agent_half_extents, tile_position, &recast_mesh);
    let t_bake_us = elapsed_us(t0);

    let (source, data) = match baked {
        Some(data) => {
            let shared = cache.set(agent_half_extents, tile_position, &recast_mesh, data);
            (TileSource::Baked, Some(shared))
        }
        None => (TileSource::Empty, None),
    };
    let _ = tx.send(JobOut {
        job_id,
        tile_position,
        source,
        data,
        t_total_us: elapsed_us(t_job_start),
        t_bake_us,
    });
}

pub struct Runtime {
    job_tx: Sender<BakeJob>,
    res_rx: Receiver<JobOut>,
    _pool: Arc<ThreadPool>,
    q_jobs: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    pub workers: usize,
}

impl Runtime {
    pub fn new(
        cache: Arc<NavMeshTilesCache>,
        baker: Arc<dyn TileBaker + Send + Sync>,
        workers: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = workers.max(1);
        let (job_tx, job_rx) = unbounded::<BakeJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let q_jobs_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_ctr = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("navcache-bake-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let cache = cache.clone();
            let baker = baker.clone();
            let q_jobs = q_jobs_ctr.clone();
            let inflight = inflight_ctr.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    q_jobs.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    process_bake_job(job, cache.as_ref(), baker.as_ref(), &tx);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::debug!(target: "runtime", "started {workers} bake worker(s)");

        Ok(Self {
            job_tx,
            res_rx,
            _pool: pool,
            q_jobs: q_jobs_ctr,
            inflight: inflight_ctr,
            workers,
        })
    }

    pub fn submit(&self, job: BakeJob) {
        self.q_jobs.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.q_jobs.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Blocks until a worker reports; `None` once every worker has gone away.
    pub fn recv_result(&self) -> Option<JobOut> {
        self.res_rx.recv().ok()
    }

    pub fn drain_results(&self, max: usize) -> Vec<JobOut> {
        self.res_rx.try_iter().take(max).collect()
    }

    /// (queued, in flight)
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.q_jobs.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }
}

/// Aggregated outcome of a run, fed one [`JobOut`] at a time.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub jobs: usize,
    pub from_cache: usize,
    pub baked: usize,
    pub empty: usize,
    /// Polygons across every tile handed back.
    pub polygons: usize,
    pub bake_us: u64,
    pub total_us: u64,
    pub max_job_us: u32,
}

impl RunReport {
    pub fn record(&mut self, out: &JobOut) {
        self.jobs += 1;
        match out.source {
            TileSource::Cache => self.from_cache += 1,
            TileSource::Baked => self.baked += 1,
            TileSource::Empty => self.empty += 1,
        }
        if let Some(data) = &out.data {
            self.polygons += data.poly_mesh.poly_count();
        }
        log::trace!(
            target: "runtime",
            "job {} tile ({}, {}) {:?} in {}us",
            out.job_id,
            out.tile_position.x,
            out.tile_position.y,
            out.source,
            out.t_total_us
        );
        self.bake_us += u64::from(out.t_bake_us);
        self.total_us += u64::from(out.t_total_us);
        self.max_job_us = self.max_job_us.max(out.t_total_us);
    }

    pub fn mean_job_us(&self) -> f64 {
        if self.jobs == 0 {
            0.0
        } else {
            self.total_us as f64 / self.jobs as f64
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "jobs={} cached={} baked={} empty={} polygons={} bake_ms={:.1} mean_job_us={:.1} max_job_us={}",
            self.jobs,
            self.from_cache,
            self.baked,
            self.empty,
            self.polygons,
            self.bake_us as f64 / 1000.0,
            self.mean_job_us(),
            self.max_job_us
        )
    }
}
