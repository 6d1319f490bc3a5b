use redis::{AsyncCommands, RedisResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

/// Outcome of a fixed-window rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Seconds until the window resets; only meaningful when rejected.
    pub retry_after: u64,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter: INCR the key, start the window on first hit,
    /// reject once the count passes the limit. The counter lives in Redis
    /// so the limit holds across server instances.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<RateLimitDecision> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: i64 = conn.incr(key, 1).await?;
        if count == 1 {
            let _: i64 = conn.expire(key, window_seconds).await?;
        }

        if count > limit {
            let ttl: i64 = conn.ttl(key).await?;
            let retry_after = if ttl > 0 { ttl as u64 } else { window_seconds as u64 };
            return Ok(RateLimitDecision {
                allowed: false,
                retry_after,
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            retry_after: 0,
        })
    }
}
