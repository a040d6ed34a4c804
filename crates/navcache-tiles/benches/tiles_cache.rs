use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use navcache_recast::generate;
use navcache_recast::{PreparedNavMeshData, RecastMesh, Version};
use navcache_tiles::{AgentHalfExtents, NavMeshTilesCache, TilePosition, entry_size};

struct Key {
    agent: AgentHalfExtents,
    tile: TilePosition,
    mesh: RecastMesh,
}

struct Item {
    key: Key,
    value: PreparedNavMeshData,
}

fn generate_items(rng: &mut StdRng, count: usize, triangles: usize) -> Vec<Item> {
    let agents = [
        AgentHalfExtents::new(29.0, 29.0, 66.0),
        AgentHalfExtents::new(45.0, 45.0, 90.0),
    ];
    (0..count)
        .map(|i| {
            let key = Key {
                agent: agents[rng.random_range(0..agents.len())],
                tile: TilePosition::new(rng.random_range(-32..32), rng.random_range(-32..32)),
                mesh: generate::recast_mesh(rng, Version::new(1, i as u64), triangles),
            };
            let size = rng.random_range(8..64);
            let value = generate::prepared_navmesh_data(rng, size);
            Item { key, value }
        })
        .collect()
}

fn total_size(items: &[Item]) -> usize {
    items
        .iter()
        .map(|item| entry_size(&item.key.mesh, &item.value))
        .sum()
}

fn fill(cache: &NavMeshTilesCache, items: &[Item]) {
    for item in items {
        black_box(cache.set(item.key.agent, item.key.tile, &item.key.mesh, item.value.clone()));
    }
}

// Cache sized to a fraction of the working set, then probed with the same keys.
fn bench_get_hit_ratio(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiles_cache_get");
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let items = generate_items(&mut rng, 256, 64);
    let all = total_size(&items);
    for percent in [25usize, 50, 100] {
        let cache = NavMeshTilesCache::new(all * percent / 100);
        fill(&cache, &items);
        group.bench_with_input(BenchmarkId::new("max_size_percent", percent), &items, |b, items| {
            let mut i = 0usize;
            b.iter(|| {
                let item = &items[i % items.len()];
                i += 1;
                black_box(cache.get(item.key.agent, item.key.tile, &item.key.mesh));
            })
        });
    }
    group.finish();
}

// Every set is a new key, so each call evicts once the cache is full.
fn bench_set_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiles_cache_set");
    let mut rng = StdRng::seed_from_u64(0xCAFE);
    for triangles in [16usize, 256] {
        let items = generate_items(&mut rng, 128, triangles);
        let cache = NavMeshTilesCache::new(total_size(&items) / 4);
        group.bench_with_input(BenchmarkId::new("triangles", triangles), &items, |b, items| {
            let mut i = 0usize;
            b.iter(|| {
                let item = &items[i % items.len()];
                i += 1;
                let mesh = RecastMesh::new(
                    Version::new(2, i as u64),
                    item.key.mesh.mesh().clone(),
                    item.key.mesh.water().to_vec(),
                    item.key.mesh.heightfields().to_vec(),
                    item.key.mesh.flat_heightfields().to_vec(),
                );
                black_box(cache.set(item.key.agent, item.key.tile, &mesh, item.value.clone()));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_get_hit_ratio, bench_set_insertion);
criterion_main!(benches);
