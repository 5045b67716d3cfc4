//! Subsystem probes and health-report aggregation.
//!
//! A [`HealthAggregator`] runs four probes in a fixed order:
//! 1. Database (`SELECT 1`)
//! 2. Cache (ping)
//! 3. Disk space of the configured filesystem
//! 4. Runtime version (informational)
//!
//! The database and cache decide whether the service is unhealthy, disk
//! pressure only degrades it, and the runtime check never affects the
//! overall status.

pub mod aggregator;
pub mod error;
pub mod probe;
pub mod report;

pub use aggregator::{CheckOptions, DATABASE_PROBE_QUERY, HealthAggregator, classify_disk_usage};
pub use common::HealthStatus;
pub use error::{ProbeError, Result};
pub use probe::{
    Cache, Database, DiskStats, DiskUsage, FixedDiskStats, InMemoryCache, InMemoryDatabase,
    PingReply, PostgresDatabase, RedisCache, RootFilesystem, RuntimeInfo,
};
pub use report::{CheckResult, Checks, HealthReport, overall_status};
