use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server settings, read from `ATLAS_*` environment variables.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub dataset: PathBuf,
    pub pages_root: PathBuf,
    pub static_root: PathBuf,
    /// Connections allowed between origin and destination.
    pub max_transfers: u32,
    /// Itineraries returned per route search.
    pub route_limit: usize,
    pub cache_ttl: Duration,
    /// Most responses kept in the cache at once.
    pub cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            dataset: root.join("data/dataset.json"),
            pages_root: root.join("pages"),
            static_root: root.join("static"),
            max_transfers: 2,
            route_limit: 10,
            cache_ttl: Duration::from_secs(12 * 60 * 60),
            cache_capacity: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: env::var("ATLAS_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.addr),
            dataset: env_var_path("ATLAS_DATASET", defaults.dataset),
            pages_root: env_var_path("ATLAS_PAGES_ROOT", defaults.pages_root),
            static_root: env_var_path("ATLAS_STATIC_ROOT", defaults.static_root),
            max_transfers: env_var_u32("ATLAS_MAX_TRANSFERS", defaults.max_transfers),
            route_limit: env_var_usize("ATLAS_ROUTE_LIMIT", defaults.route_limit),
            cache_ttl: Duration::from_secs(env_var_u64(
                "ATLAS_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            cache_capacity: env_var_usize("ATLAS_CACHE_CAPACITY", defaults.cache_capacity),
        }
    }

    /// Longest itinerary searched, in flights.
    pub fn max_legs(&self) -> usize {
        self.max_transfers as usize + 1
    }
}

fn env_var_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}

fn env_var_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
