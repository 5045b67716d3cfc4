use serde::{Deserialize, Serialize};

/// Three-valued health of a single probe or of a whole report.
///
/// Variants are ordered from best to worst, so the worse of two statuses
/// is simply their maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// All statuses, best first.
    pub const ALL: [HealthStatus; 3] = [Self::Healthy, Self::Degraded, Self::Unhealthy];

    /// Returns true only for `Healthy`.
    pub fn is_healthy(self) -> bool {
        self == Self::Healthy
    }

    /// HTTP status code a health endpoint answers with for this status.
    ///
    /// A degraded service still serves traffic, so it shares 200 with a
    /// healthy one; only `Unhealthy` maps to 503.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Healthy | Self::Degraded => 200,
            Self::Unhealthy => 503,
        }
    }

    /// Lowercase name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
