//! Check results and the aggregated health report.

use common::HealthStatus;
use serde::{Deserialize, Serialize};

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_used: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
}

impl CheckResult {
    fn with_status(status: HealthStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            percent_used: None,
            version: None,
            required: None,
        }
    }

    pub fn healthy(message: impl Into<String>) -> Self {
        Self::with_status(HealthStatus::Healthy, message)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(HealthStatus::Degraded, message)
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(HealthStatus::Unhealthy, message)
    }

    pub fn with_percent_used(mut self, percent_used: u8) -> Self {
        self.percent_used = Some(percent_used);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>, required: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self.required = Some(required.into());
        self
    }
}

/// Per-subsystem results of one health run, serialized as an object keyed
/// by check name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checks {
    pub database: CheckResult,
    pub cache: CheckResult,
    pub disk_space: CheckResult,
    pub runtime: CheckResult,
}

impl Checks {
    /// Check names paired with their results, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CheckResult)> {
        [
            ("database", &self.database),
            ("cache", &self.cache),
            ("disk_space", &self.disk_space),
            ("runtime", &self.runtime),
        ]
        .into_iter()
    }
}

/// Derives the overall status from the checks that can influence it.
///
/// A failing database or cache makes the whole service unhealthy. Disk
/// pressure of any level only degrades it. The runtime check is
/// informational and takes no part.
pub fn overall_status(
    database: HealthStatus,
    cache: HealthStatus,
    disk_space: HealthStatus,
) -> HealthStatus {
    if database == HealthStatus::Unhealthy || cache == HealthStatus::Unhealthy {
        HealthStatus::Unhealthy
    } else if !disk_space.is_healthy() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Snapshot of service health produced by one aggregator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    status: HealthStatus,
    timestamp: i64,
    checks: Checks,
}

impl HealthReport {
    /// Builds a report, deriving the overall status from `checks`.
    pub fn new(checks: Checks, timestamp: i64) -> Self {
        let status = overall_status(
            checks.database.status,
            checks.cache.status,
            checks.disk_space.status,
        );
        Self {
            status,
            timestamp,
            checks,
        }
    }

    /// Overall status.
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Unix seconds at which the report was produced.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn checks(&self) -> &Checks {
        &self.checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checks() -> Checks {
        Checks {
            database: CheckResult::healthy("Database connection successful"),
            cache: CheckResult::healthy("Cache connection successful"),
            disk_space: CheckResult::healthy("Disk space OK: 50% used").with_percent_used(50),
            runtime: CheckResult::healthy("Rust version 1.85.0 (requires ^1.85)").with_version("1.85.0", "^1.85"),
        }
    }

    #[test]
    fn serializes_to_the_endpoint_shape() {
        let report = HealthReport::new(checks(), 1_700_000_000);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["timestamp"], 1_700_000_000);
        assert_eq!(json["checks"]["database"]["status"], "healthy");
        assert_eq!(json["checks"]["disk_space"]["percent_used"], 50);
        assert_eq!(json["checks"]["runtime"]["version"], "1.85.0");
        assert_eq!(json["checks"]["runtime"]["required"], "^1.85");
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let json = serde_json::to_value(CheckResult::unhealthy("down")).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("status"));
        assert!(object.contains_key("message"));
    }

    #[test]
    fn report_derives_status_from_checks() {
        let mut degraded = checks();
        degraded.disk_space = CheckResult::degraded("Disk space warning: 85% used");
        assert_eq!(
            HealthReport::new(degraded, 0).status(),
            HealthStatus::Degraded
        );

        let mut unhealthy = checks();
        unhealthy.cache = CheckResult::unhealthy("Cache ping failed");
        unhealthy.disk_space = CheckResult::degraded("Disk space warning: 85% used");
        assert_eq!(
            HealthReport::new(unhealthy, 0).status(),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn rebuilt_report_rederives_status_from_checks() {
        // A payload whose overall status contradicts its checks.
        let payload = serde_json::json!({
            "status": "healthy",
            "timestamp": 0,
            "checks": {
                "database": { "status": "unhealthy", "message": "Database query failed" },
                "cache": { "status": "healthy", "message": "Cache connection successful" },
                "disk_space": { "status": "healthy", "message": "Disk space OK: 10% used", "percent_used": 10 },
                "runtime": { "status": "healthy", "message": "Rust version 1.85.0 (requires ^1.85)" }
            }
        });

        let checks: Checks = serde_json::from_value(payload["checks"].clone()).unwrap();
        let report = HealthReport::new(checks, 0);

        assert_eq!(report.status(), HealthStatus::Unhealthy);
    }

    #[test]
    fn iter_follows_execution_order() {
        let names: Vec<_> = checks().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["database", "cache", "disk_space", "runtime"]);
    }
}
