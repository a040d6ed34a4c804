use std::error::Error;
use std::fs;
use std::path::Path;

use navcache_recast::MeshComparison;
use serde::Deserialize;

pub const DEFAULT_MAX_TILES_CACHE_SIZE: usize = 268_435_456;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Byte budget for keys and values together.
    #[serde(default = "default_max_tiles_cache_size")]
    pub max_tiles_cache_size: usize,
    #[serde(default)]
    pub mesh_comparison: MeshComparison,
}

fn default_max_tiles_cache_size() -> usize {
    DEFAULT_MAX_TILES_CACHE_SIZE
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_tiles_cache_size: default_max_tiles_cache_size(),
            mesh_comparison: MeshComparison::default(),
        }
    }
}

impl CacheSettings {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let settings: CacheSettings = toml::from_str(toml_str)?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
