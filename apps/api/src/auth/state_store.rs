use anyhow::Result;
use redis::Client as RedisClient;
use tracing::debug;
use uuid::Uuid;

const STATE_TTL_SECS: u64 = 600;

/// One-time OAuth `state` values, kept in Redis until the provider redirects back.
#[derive(Clone)]
pub struct OAuthStateStore {
    redis: RedisClient,
}

impl OAuthStateStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    /// Generates and records a fresh state value.
    pub async fn issue(&self) -> Result<String> {
        let state = Uuid::new_v4().simple().to_string();
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(state_key(&state))
            .arg(1)
            .arg("EX")
            .arg(STATE_TTL_SECS)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Issued OAuth state {state}");
        Ok(state)
    }

    /// Returns true exactly once for a state previously issued and not yet expired.
    pub async fn consume(&self, state: &str) -> Result<bool> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let found: Option<String> = redis::cmd("GETDEL")
            .arg(state_key(state))
            .query_async(&mut conn)
            .await?;
        Ok(found.is_some())
    }
}

fn state_key(state: &str) -> String {
    format!("oauth_state:{state}")
}
