pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http_utils;
pub mod iex;
pub mod stocktwits;
pub mod utils;

// Re-export the pieces needed to wire a dashboard together
pub use cache::{CacheStore, MemoryStore, ReadThroughCache, RedisStore, TtlPolicy, UnavailableStore};
pub use config::Config;
pub use dashboard::{Dashboard, Screen};
pub use error::{CacheUnavailableError, DashboardError, RemoteFetchError};
