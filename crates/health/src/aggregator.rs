//! Sequential health aggregation over the injected probes.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::error::{ProbeError, Result};
use crate::probe::{Cache, Database, DiskStats, RootFilesystem, RuntimeInfo};
use crate::report::{CheckResult, Checks, HealthReport};

/// Query sent to the database probe.
pub const DATABASE_PROBE_QUERY: &str = "SELECT 1";

/// Tunables for a health run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Upper bound on the database query.
    pub database_timeout: Duration,
    /// Upper bound on the cache ping.
    pub cache_timeout: Duration,
    /// Upper bound on the filesystem statistics call.
    pub disk_timeout: Duration,
    /// Path whose filesystem the disk check inspects.
    pub disk_path: PathBuf,
    /// Usage strictly above this percentage degrades the disk check.
    pub disk_warning_percent: u8,
    /// Usage strictly above this percentage makes the disk check unhealthy.
    pub disk_critical_percent: u8,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            database_timeout: Duration::from_secs(2),
            cache_timeout: Duration::from_secs(2),
            disk_timeout: Duration::from_secs(2),
            disk_path: PathBuf::from("/"),
            disk_warning_percent: 80,
            disk_critical_percent: 90,
        }
    }
}

impl CheckOptions {
    /// Lowers the warning threshold to the critical one when it was set
    /// above it, so usage between the two cannot skip straight from
    /// healthy to unhealthy unnoticed.
    pub fn normalized(mut self) -> Self {
        if self.disk_warning_percent > self.disk_critical_percent {
            tracing::warn!(
                warning = self.disk_warning_percent,
                critical = self.disk_critical_percent,
                "disk warning threshold above critical threshold, clamping"
            );
            self.disk_warning_percent = self.disk_critical_percent;
        }
        self
    }
}

/// Runs the subsystem probes and folds them into a [`HealthReport`].
///
/// Probes run one after another in a fixed order (database, cache, disk
/// space, runtime) and every probe runs even when an earlier one failed.
/// Probe failures never escape: each becomes an unhealthy check result.
pub struct HealthAggregator {
    database: Arc<dyn Database>,
    cache: Arc<dyn Cache>,
    disk: Arc<dyn DiskStats>,
    runtime: RuntimeInfo,
    options: CheckOptions,
}

impl HealthAggregator {
    /// Creates an aggregator over the given database and cache, reading disk
    /// usage of the root filesystem.
    pub fn new(database: Arc<dyn Database>, cache: Arc<dyn Cache>) -> Self {
        Self {
            database,
            cache,
            disk: Arc::new(RootFilesystem::new()),
            runtime: RuntimeInfo::current(),
            options: CheckOptions::default(),
        }
    }

    pub fn with_disk(mut self, disk: Arc<dyn DiskStats>) -> Self {
        self.disk = disk;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options.normalized();
        self
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Runs every probe and returns a fresh report.
    #[tracing::instrument(skip(self))]
    pub async fn check_health(&self) -> HealthReport {
        let database = timed("database", self.check_database()).await;
        let cache = timed("cache", self.check_cache()).await;
        let disk_space = timed("disk_space", self.check_disk_space()).await;
        let runtime = timed("runtime", async { self.check_runtime() }).await;

        let report = HealthReport::new(
            Checks {
                database,
                cache,
                disk_space,
                runtime,
            },
            Utc::now().timestamp(),
        );

        metrics::counter!("health_reports_total", "status" => report.status().as_str())
            .increment(1);
        tracing::debug!(status = %report.status(), "health report produced");
        report
    }

    async fn check_database(&self) -> CheckResult {
        let outcome = bounded(
            self.options.database_timeout,
            self.database.execute(DATABASE_PROBE_QUERY),
        )
        .await;

        match outcome {
            Ok(true) => CheckResult::healthy("Database connection successful"),
            Ok(false) => {
                tracing::warn!(check = "database", "probe query returned no result");
                CheckResult::unhealthy("Database query failed")
            }
            Err(e) => {
                tracing::warn!(check = "database", error = %e, "health probe failed");
                CheckResult::unhealthy(format!("Database connection failed: {e}"))
            }
        }
    }

    async fn check_cache(&self) -> CheckResult {
        match bounded(self.options.cache_timeout, self.cache.ping()).await {
            Ok(reply) if reply.is_pong() => CheckResult::healthy("Cache connection successful"),
            Ok(reply) => {
                tracing::warn!(check = "cache", ?reply, "unexpected ping reply");
                CheckResult::unhealthy("Cache ping failed")
            }
            Err(e) => {
                tracing::warn!(check = "cache", error = %e, "health probe failed");
                CheckResult::unhealthy(format!("Cache connection failed: {e}"))
            }
        }
    }

    /// Reads disk usage on the blocking pool so a stalled mount cannot hold
    /// up a runtime worker past `disk_timeout`.
    async fn check_disk_space(&self) -> CheckResult {
        let disk = Arc::clone(&self.disk);
        let path = self.options.disk_path.clone();
        let stat = async move {
            tokio::task::spawn_blocking(move || disk.usage(&path))
                .await
                .unwrap_or_else(|e| Err(ProbeError::Unavailable(e.to_string())))
        };

        let percent_used = bounded(self.options.disk_timeout, stat)
            .await
            .and_then(|usage| {
                usage.percent_used().ok_or_else(|| {
                    ProbeError::Unavailable("filesystem reports zero capacity".to_string())
                })
            });

        match percent_used {
            Ok(percent) => classify_disk_usage(
                percent,
                self.options.disk_warning_percent,
                self.options.disk_critical_percent,
            ),
            Err(e) => {
                tracing::warn!(check = "disk_space", error = %e, "health probe failed");
                CheckResult::unhealthy(format!("Disk space check failed: {e}"))
            }
        }
    }

    fn check_runtime(&self) -> CheckResult {
        CheckResult::healthy(format!(
            "Rust version {} (requires {})",
            self.runtime.version, self.runtime.required
        ))
        .with_version(self.runtime.version.clone(), self.runtime.required.clone())
    }
}

/// Maps a usage percentage onto a disk check result. Both thresholds are
/// exclusive.
pub fn classify_disk_usage(percent: u8, warning: u8, critical: u8) -> CheckResult {
    let result = if percent > critical {
        CheckResult::unhealthy(format!("Disk space critical: {percent}% used"))
    } else if percent > warning {
        CheckResult::degraded(format!("Disk space warning: {percent}% used"))
    } else {
        CheckResult::healthy(format!("Disk space OK: {percent}% used"))
    };
    result.with_percent_used(percent)
}

async fn bounded<T>(limit: Duration, probe: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, probe)
        .await
        .unwrap_or(Err(ProbeError::Timeout { after: limit }))
}

async fn timed(check: &'static str, probe: impl Future<Output = CheckResult>) -> CheckResult {
    let start = Instant::now();
    let result = probe.await;
    metrics::histogram!("health_check_duration_seconds", "check" => check)
        .record(start.elapsed().as_secs_f64());
    metrics::counter!(
        "health_checks_total",
        "check" => check,
        "status" => result.status.as_str()
    )
    .increment(1);
    result
}
