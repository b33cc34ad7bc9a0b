use super::key::Category;
use std::{collections::HashMap, time::Duration};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest expiry any store is asked to apply (100 years).
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Expiry applied per category when a freshly loaded value is stored.
///
/// Categories without an entry are cached until external eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    ttls: HashMap<Category, Duration>,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        let mut ttls = HashMap::new();
        ttls.insert(Category::Logo, DAY);
        ttls.insert(Category::Company, DAY);
        Self { ttls }
    }
}

impl TtlPolicy {
    /// Applies `CACHE_TTL_SECS`-style overrides on top of the defaults. `0` disables expiry.
    pub fn with_overrides(overrides: &HashMap<Category, u64>) -> Self {
        let mut policy = Self::default();
        for (category, secs) in overrides {
            policy.set(*category, Duration::from_secs(*secs));
        }
        policy
    }

    /// Zero removes the expiry; anything above `MAX_TTL` is capped.
    pub fn set(&mut self, category: Category, ttl: Duration) {
        if ttl.is_zero() {
            self.ttls.remove(&category);
        } else {
            self.ttls.insert(category, ttl.min(MAX_TTL));
        }
    }

    pub fn ttl_for(&self, category: Category) -> Option<Duration> {
        self.ttls.get(&category).copied()
    }
}
