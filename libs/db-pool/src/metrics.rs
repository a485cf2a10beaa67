//! Connection pool statistics
//!
//! Point-in-time pool counts, reported through tracing

use sqlx::PgPool;

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub active: u32,
    pub max: u32,
}

impl PoolStats {
    /// Fraction of the maximum pool size currently checked out
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.active) / f64::from(self.max)
    }
}

pub fn pool_stats(pool: &PgPool) -> PoolStats {
    let size = pool.size();
    let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX);
    PoolStats {
        size,
        idle,
        active: size.saturating_sub(idle),
        max: pool.options().get_max_connections(),
    }
}

/// Emit the current pool counts at debug level
pub fn log_pool_stats(pool: &PgPool) {
    let stats = pool_stats(pool);
    tracing::debug!(
        size = stats.size,
        idle = stats.idle,
        active = stats.active,
        max = stats.max,
        "Database pool stats"
    );
}
