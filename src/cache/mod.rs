//! Read-through caching of remote API responses.

pub mod clock;
pub mod key;
pub mod memory;
pub mod policy;
pub mod read_through;
pub mod redis_store;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{normalize_symbol, Category, ResourceKey};
pub use memory::MemoryStore;
pub use policy::{TtlPolicy, MAX_TTL};
pub use read_through::{CacheMetrics, CacheMetricsSnapshot, ReadThroughCache};
pub use redis_store::RedisStore;
pub use store::{CacheStore, UnavailableStore};
