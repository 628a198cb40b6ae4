//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, Generation};
use async_trait::async_trait;
use redis::{AsyncCommands, AsyncIter, Client, Script, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Per-code generation counters outlive any in-flight lookup by a wide margin.
const GENERATION_TTL_SECONDS: i64 = 86_400;

/// Keys deleted per DEL while clearing the cache.
const CLEAR_BATCH_SIZE: usize = 500;

/// Writes the destination only if neither generation moved since it was read.
///
/// KEYS: url key, epoch key, code generation key.
/// ARGV: observed epoch, observed code generation, destination, ttl seconds.
const SET_IF_CURRENT_SCRIPT: &str = r#"
    if tonumber(redis.call("get", KEYS[2]) or "0") == tonumber(ARGV[1])
        and tonumber(redis.call("get", KEYS[3]) or "0") == tonumber(ARGV[2]) then
        redis.call("set", KEYS[1], ARGV[3], "EX", ARGV[4])
        return 1
    end
    return 0
"#;

/// Redis cache shared by every instance of the service.
///
/// Uses `ConnectionManager` for connection reuse and reconnects. All operations
/// are fail-open: errors are logged and reported as misses or no-ops.
///
/// Invalidation bumps a counter in Redis (`shrtn:gen:{code}` for one code,
/// `shrtn:epoch` for a full clear) so conditional writes from every instance
/// observe deletes made by any other.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
    set_if_current: Script,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "shrtn:".to_string(),
            set_if_current: Script::new(SET_IF_CURRENT_SCRIPT),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}url:{}", self.key_prefix, short_code)
    }

    fn generation_key(&self, short_code: &str) -> String {
        format!("{}gen:{}", self.key_prefix, short_code)
    }

    fn epoch_key(&self) -> String {
        format!("{}epoch", self.key_prefix)
    }

    /// Deletes every key matching `pattern`, scanning instead of blocking on KEYS.
    async fn delete_matching(&self, pattern: &str) -> redis::RedisResult<u64> {
        let mut scan_conn = self.client.clone();
        let mut del_conn = self.client.clone();
        let mut keys: AsyncIter<String> = scan_conn.scan_match(pattern).await?;

        let mut deleted = 0u64;
        let mut batch = Vec::with_capacity(CLEAR_BATCH_SIZE);
        while let Some(key) = keys.next_item().await {
            batch.push(key?);
            if batch.len() == CLEAR_BATCH_SIZE {
                deleted += del_conn.del::<_, u64>(&batch).await?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            deleted += del_conn.del::<_, u64>(&batch).await?;
        }

        Ok(deleted)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) => {
                debug!(short_code, "Redis cache hit");
                Ok(Some(url))
            }
            Ok(None) => {
                debug!(short_code, "Redis cache miss");
                Ok(None)
            }
            Err(e) => {
                error!(error = %e, short_code, "Redis GET failed, treating as miss");
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl_seconds.unwrap_or(self.default_ttl);

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, original_url, ttl_seconds)
            .await
        {
            warn!(error = %e, short_code, "Redis SET failed");
        } else {
            debug!(short_code, ttl_seconds, "Redis cache populated");
        }

        Ok(())
    }

    async fn generation(&self, short_code: &str) -> CacheResult<Generation> {
        let mut conn = self.client.clone();
        let keys = [self.epoch_key(), self.generation_key(short_code)];

        let (epoch, code): (Option<u64>, Option<u64>) = conn
            .mget(&keys[..])
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis MGET failed: {}", e)))?;

        Ok(Generation {
            epoch: epoch.unwrap_or_default(),
            code: code.unwrap_or_default(),
        })
    }

    async fn set_url_if_current(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
        observed: Generation,
    ) -> CacheResult<bool> {
        let mut conn = self.client.clone();
        let ttl_seconds = ttl_seconds.unwrap_or(self.default_ttl);

        let stored: i32 = match self
            .set_if_current
            .key(self.build_key(short_code))
            .key(self.epoch_key())
            .key(self.generation_key(short_code))
            .arg(observed.epoch)
            .arg(observed.code)
            .arg(original_url)
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, short_code, "Redis conditional SET failed");
                return Ok(false);
            }
        };

        if stored == 1 {
            debug!(short_code, ttl_seconds, "Redis cache populated");
        } else {
            debug!(short_code, "Redis SET skipped, invalidated since read");
        }
        Ok(stored == 1)
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let generation_key = self.generation_key(short_code);
        let mut conn = self.client.clone();

        let result: redis::RedisResult<(i64,)> = redis::pipe()
            .atomic()
            .incr(&generation_key, 1)
            .ignore()
            .expire(&generation_key, GENERATION_TTL_SECONDS)
            .ignore()
            .del(&key)
            .query_async(&mut conn)
            .await;

        match result {
            Ok((deleted,)) if deleted > 0 => debug!(short_code, "Redis entry evicted"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, short_code, "Redis invalidation failed"),
        }

        Ok(())
    }

    async fn invalidate_all(&self) -> CacheResult<()> {
        let mut conn = self.client.clone();

        if let Err(e) = conn.incr::<_, _, i64>(self.epoch_key(), 1).await {
            warn!(error = %e, "Redis INCR failed while clearing cache");
        }

        for pattern in [self.build_key("*"), self.generation_key("*")] {
            match self.delete_matching(&pattern).await {
                Ok(deleted) => debug!(deleted, %pattern, "Redis keys cleared"),
                Err(e) => warn!(error = %e, %pattern, "Redis SCAN/DEL failed while clearing cache"),
            }
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
