//! In-memory probe doubles for tests and local runs.

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::{Cache, Database, DiskStats, DiskUsage, PingReply};
use crate::error::{ProbeError, Result};

#[derive(Debug)]
struct InMemoryDatabaseState {
    fail_with: Option<String>,
    returns_rows: bool,
    latency: Option<Duration>,
    queries: Vec<String>,
}

impl Default for InMemoryDatabaseState {
    fn default() -> Self {
        Self {
            fail_with: None,
            returns_rows: true,
            latency: None,
            queries: Vec::new(),
        }
    }
}

/// In-memory database that answers every query with one row.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<RwLock<InMemoryDatabaseState>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent query fail with `message`, or succeed again
    /// when `None`.
    pub fn set_fail_with(&self, message: Option<&str>) {
        self.state.write().unwrap().fail_with = message.map(str::to_string);
    }

    /// Controls whether queries produce a result.
    pub fn set_returns_rows(&self, returns_rows: bool) {
        self.state.write().unwrap().returns_rows = returns_rows;
    }

    /// Delays every query by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().unwrap().latency = latency;
    }

    /// Returns the queries executed so far, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.state.read().unwrap().queries.clone()
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn execute(&self, query: &str) -> Result<bool> {
        let latency = {
            let mut state = self.state.write().unwrap();
            state.queries.push(query.to_string());
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.read().unwrap();
        match &state.fail_with {
            Some(message) => Err(ProbeError::Unavailable(message.clone())),
            None => Ok(state.returns_rows),
        }
    }
}

#[derive(Debug)]
struct InMemoryCacheState {
    reply: PingReply,
    fail_with: Option<String>,
    latency: Option<Duration>,
    pings: usize,
}

impl Default for InMemoryCacheState {
    fn default() -> Self {
        Self {
            reply: PingReply::Bool(true),
            fail_with: None,
            latency: None,
            pings: 0,
        }
    }
}

/// In-memory cache that answers pings with a configurable reply.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    state: Arc<RwLock<InMemoryCacheState>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reply returned by subsequent pings.
    pub fn set_reply(&self, reply: PingReply) {
        self.state.write().unwrap().reply = reply;
    }

    /// Makes every subsequent ping fail with `message`, or succeed again
    /// when `None`.
    pub fn set_fail_with(&self, message: Option<&str>) {
        self.state.write().unwrap().fail_with = message.map(str::to_string);
    }

    /// Delays every ping by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().unwrap().latency = latency;
    }

    /// Number of pings received.
    pub fn ping_count(&self) -> usize {
        self.state.read().unwrap().pings
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn ping(&self) -> Result<PingReply> {
        let latency = {
            let mut state = self.state.write().unwrap();
            state.pings += 1;
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.read().unwrap();
        match &state.fail_with {
            Some(message) => Err(ProbeError::Unavailable(message.clone())),
            None => Ok(state.reply.clone()),
        }
    }
}

/// Disk statistics fixed at construction.
#[derive(Debug, Clone)]
pub struct FixedDiskStats {
    usage: std::result::Result<DiskUsage, String>,
    latency: Option<Duration>,
}

impl FixedDiskStats {
    pub fn new(usage: DiskUsage) -> Self {
        Self {
            usage: Ok(usage),
            latency: None,
        }
    }

    /// A 100-byte filesystem with `percent` bytes in use.
    pub fn with_percent_used(percent: u8) -> Self {
        let percent = u64::from(percent.min(100));
        Self::new(DiskUsage {
            free_bytes: 100 - percent,
            total_bytes: 100,
        })
    }

    /// A filesystem whose statistics call always fails.
    pub fn failing(message: &str) -> Self {
        Self {
            usage: Err(message.to_string()),
            latency: None,
        }
    }

    /// Blocks the calling thread for `latency` on every read, like a
    /// stalled network mount.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

impl DiskStats for FixedDiskStats {
    fn usage(&self, _path: &Path) -> Result<DiskUsage> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        self.usage
            .clone()
            .map_err(|message| ProbeError::Io(std::io::Error::other(message)))
    }
}
