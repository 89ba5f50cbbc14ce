use crate::services::{CreditLedger, LedgerError, SpendOutcome};
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, ErrorKind, RedisError, Script};

// KEYS[1] = profile hash, ARGV[1] = amount. nil when the profile is absent.
const ADD_CREDITS: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return nil
end
return redis.call('HINCRBY', KEYS[1], 'credits', ARGV[1])
"#;

// Returns nil (no profile), {0, current} (insufficient) or {1, remaining}.
const SPEND_CREDITS: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return nil
end
local current = tonumber(redis.call('HGET', KEYS[1], 'credits') or '0')
local amount = tonumber(ARGV[1])
if current < amount then
  return {0, current}
end
return {1, redis.call('HINCRBY', KEYS[1], 'credits', -amount)}
"#;

/// Credit balances in Redis hashes (`profile:<user_id>`, field `credits`).
/// Each mutation runs as a single Lua script, so it is atomic server-side.
pub struct RedisLedger {
    redis: ConnectionManager,
    add_script: Script,
    spend_script: Script,
}

impl RedisLedger {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid REDIS_URL")?;
        let redis = client
            .get_connection_manager()
            .await
            .context("Redis connection failed")?;

        tracing::info!("Redis connected successfully");

        Ok(Self {
            redis,
            add_script: Script::new(ADD_CREDITS),
            spend_script: Script::new(SPEND_CREDITS),
        })
    }

    pub fn profile_key(user_id: &str) -> String {
        format!("profile:{}", user_id)
    }
}

/// Transport failures mean nothing was read, so they count as lookup errors.
/// Anything Redis itself rejected, such as an `HINCRBY` overflow, is a write error.
fn store_error(e: RedisError) -> LedgerError {
    if e.is_io_error() || e.kind() == ErrorKind::IoError {
        LedgerError::Read(e.to_string())
    } else {
        LedgerError::Write(e.to_string())
    }
}

#[async_trait]
impl CreditLedger for RedisLedger {
    async fn add_credits(&self, user_id: &str, amount: i64) -> Result<i64, LedgerError> {
        let mut redis = self.redis.clone();

        let new_total: Option<i64> = self
            .add_script
            .key(Self::profile_key(user_id))
            .arg(amount)
            .invoke_async(&mut redis)
            .await
            .map_err(store_error)?;

        new_total.ok_or_else(|| LedgerError::ProfileNotFound(user_id.to_string()))
    }

    async fn spend_credits(&self, user_id: &str, amount: i64) -> Result<SpendOutcome, LedgerError> {
        let mut redis = self.redis.clone();

        let reply: Option<(i64, i64)> = self
            .spend_script
            .key(Self::profile_key(user_id))
            .arg(amount)
            .invoke_async(&mut redis)
            .await
            .map_err(store_error)?;

        match reply {
            None => Err(LedgerError::ProfileNotFound(user_id.to_string())),
            Some((0, current)) => Ok(SpendOutcome::Insufficient { current }),
            Some((_, remaining)) => Ok(SpendOutcome::Spent { remaining }),
        }
    }

    async fn ping(&self) -> bool {
        let mut redis = self.redis.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut redis).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Redis ping failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
