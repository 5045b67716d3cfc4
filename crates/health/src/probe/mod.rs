//! Narrow interfaces to the subsystems a health report inspects.
//!
//! The aggregator only ever sees these traits, so every backend can be
//! swapped for one of the in-memory doubles in [`memory`].

pub mod disk;
pub mod memory;
pub mod postgres;
pub mod redis;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use disk::RootFilesystem;
pub use memory::{FixedDiskStats, InMemoryCache, InMemoryDatabase};
pub use postgres::PostgresDatabase;
pub use self::redis::RedisCache;

/// A relational database that can run a trivial query.
#[async_trait]
pub trait Database: Send + Sync {
    /// Executes `query` and reports whether it produced a result.
    async fn execute(&self, query: &str) -> Result<bool>;
}

/// Reply to a cache ping.
///
/// Clients differ in how they surface `PING`: some return a boolean, some
/// the raw status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingReply {
    Bool(bool),
    Text(String),
}

impl PingReply {
    /// Raw status line accepted as a successful ping.
    pub const PONG: &'static str = "+PONG";

    /// True for `Bool(true)` and for the literal `+PONG` status line.
    pub fn is_pong(&self) -> bool {
        match self {
            PingReply::Bool(ok) => *ok,
            PingReply::Text(text) => text == Self::PONG,
        }
    }
}

/// An in-memory key-value store that answers pings.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn ping(&self) -> Result<PingReply>;
}

/// Free and total bytes of a filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub free_bytes: u64,
    pub total_bytes: u64,
}

impl DiskUsage {
    /// Used share of the filesystem in whole percent, rounded half away
    /// from zero and clamped to `0..=100`.
    ///
    /// Returns `None` for a filesystem reporting zero total bytes.
    pub fn percent_used(&self) -> Option<u8> {
        if self.total_bytes == 0 {
            return None;
        }
        let used = self.total_bytes.saturating_sub(self.free_bytes) as f64;
        let percent = (used / self.total_bytes as f64 * 100.0).round();
        Some(percent.clamp(0.0, 100.0) as u8)
    }
}

/// Source of filesystem statistics.
pub trait DiskStats: Send + Sync {
    fn usage(&self, path: &Path) -> Result<DiskUsage>;
}

/// Version information reported by the runtime check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Version of the compiler that built the running binary.
    pub version: String,
    /// Toolchain constraint the service was built against.
    pub required: String,
}

impl RuntimeInfo {
    /// Describes the toolchain this crate was compiled with.
    pub fn current() -> Self {
        Self {
            version: env!("RUSTC_VERSION").to_string(),
            required: format!("^{}", env!("CARGO_PKG_RUST_VERSION")),
        }
    }

    /// Whether `version` meets the caret constraint in `required`: same
    /// major version and not older.
    pub fn satisfies_required(&self) -> bool {
        let Some(required) = self.required.strip_prefix('^').and_then(parse_version) else {
            return false;
        };
        match parse_version(&self.version) {
            Some(version) => version.0 == required.0 && version >= required,
            None => false,
        }
    }
}

/// Parses `major[.minor[.patch]]`, ignoring pre-release and build suffixes.
fn parse_version(text: &str) -> Option<(u64, u64, u64)> {
    let core = text.split(['-', '+']).next()?;
    let mut parts = core.split('.').map(str::parse::<u64>);
    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    Some((major, minor, patch))
}

impl Default for RuntimeInfo {
    fn default() -> Self {
        Self::current()
    }
}
