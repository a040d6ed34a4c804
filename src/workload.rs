use std::sync::Arc;

use hashbrown::HashMap;
use navcache_geom::{AgentHalfExtents, TilePosition};
use navcache_recast::{RecastMesh, Version, generate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::runtime::BakeJob;

const AGENT_PRESETS: [AgentHalfExtents; 4] = [
    AgentHalfExtents::new(29.0, 29.0, 66.0),
    AgentHalfExtents::new(45.0, 45.0, 90.0),
    AgentHalfExtents::new(18.0, 18.0, 38.0),
    AgentHalfExtents::new(64.0, 64.0, 128.0),
];

#[derive(Clone, Debug)]
pub struct WorkloadConfig {
    pub agents: usize,
    /// Side of the square tile grid centred on the origin.
    pub tiles: i32,
    /// Geometry variants per tile (doors, moved scenery).
    pub variants: usize,
    pub jobs: usize,
    /// Triangles per snapshot.
    pub mesh_size: usize,
    pub seed: u64,
}

pub struct Workload {
    pub agents: Vec<AgentHalfExtents>,
    pub snapshots: HashMap<(TilePosition, usize), Arc<RecastMesh>>,
    pub jobs: Vec<BakeJob>,
}

impl Workload {
    pub fn generate(cfg: &WorkloadConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let agents: Vec<AgentHalfExtents> = (0..cfg.agents.max(1))
            .map(|i| {
                let base = AGENT_PRESETS[i % AGENT_PRESETS.len()];
                let scale = 1.0 + (i / AGENT_PRESETS.len()) as f32;
                AgentHalfExtents(base.extents() * scale)
            })
            .collect();

        let side = cfg.tiles.max(1);
        let half = side / 2;
        let variants = cfg.variants.max(1);
        let mut snapshots = HashMap::new();
        for y in 0..side {
            for x in 0..side {
                let tile = TilePosition::new(x - half, y - half);
                for variant in 0..variants {
                    let version = Version::new(1, variant as u64);
                    let mesh = generate::recast_mesh(&mut rng, version, cfg.mesh_size);
                    snapshots.insert((tile, variant), Arc::new(mesh));
                }
            }
        }

        let mut jobs = Vec::with_capacity(cfg.jobs);
        for job_id in 0..cfg.jobs as u64 {
            let agent = agents[rng.random_range(0..agents.len())];
            let tile = TilePosition::new(
                rng.random_range(0..side) - half,
                rng.random_range(0..side) - half,
            );
            // Variant 0 is the resting state and dominates.
            let variant = if rng.random_bool(0.7) {
                0
            } else {
                rng.random_range(0..variants)
            };
            let Some(recast_mesh) = snapshots.get(&(tile, variant)) else {
                continue;
            };
            jobs.push(BakeJob {
                job_id,
                agent_half_extents: agent,
                tile_position: tile,
                recast_mesh: Arc::clone(recast_mesh),
            });
        }

        log::debug!(
            target: "workload",
            "generated {} jobs over {} snapshots for {} agent(s)",
            jobs.len(),
            snapshots.len(),
            agents.len()
        );
        Self {
            agents,
            snapshots,
            jobs,
        }
    }
}
