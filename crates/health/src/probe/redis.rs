//! Redis cache probe.

use std::time::Duration;

use async_trait::async_trait;
use redis::Client;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;

use super::{Cache, PingReply};
use crate::error::{ProbeError, Result};

/// Redis-backed cache probe.
///
/// The connection is opened on the first ping and reused afterwards. It is
/// only returned to the slot after a successful reply, so a failed,
/// timed-out or cancelled ping leaves the slot empty and the next ping
/// reconnects.
pub struct RedisCache {
    client: Client,
    conn: Mutex<Option<MultiplexedConnection>>,
    response_timeout: Option<Duration>,
}

impl RedisCache {
    /// Creates a probe for `redis_url` without connecting.
    pub fn open(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client,
            conn: Mutex::new(None),
            response_timeout: None,
        })
    }

    /// Bounds connecting plus the `PING` round trip.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    async fn ping_once(&self) -> Result<PingReply> {
        let cached = self.conn.lock().await.take();
        let mut conn = match cached {
            Some(conn) => conn,
            None => self.client.get_multiplexed_tokio_connection().await?,
        };

        let reply: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match reply {
            Ok(text) => {
                *self.conn.lock().await = Some(conn);
                if text == "PONG" {
                    Ok(PingReply::Bool(true))
                } else {
                    Ok(PingReply::Text(text))
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "dropping redis connection after failed ping");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn ping(&self) -> Result<PingReply> {
        match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, self.ping_once())
                .await
                .unwrap_or(Err(ProbeError::Timeout { after: limit })),
            None => self.ping_once().await,
        }
    }
}
