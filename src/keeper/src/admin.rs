//! Admin API of the streaming platform.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{KeeperError, Result};

/// Requests are abandoned, and the run fails, after this long.
pub const ADMIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The admin capability needed after segments were removed from the bucket.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Ask the broker owning `topic/partition` to resynchronize its local
    /// shadow indexing state with the bucket.
    async fn sync_local_state(&self, topic: &str, partition: i32) -> Result<()>;
}

/// HTTP client for the admin API
pub struct AdminClient {
    base_url: String,
    http: reqwest::Client,
}

impl AdminClient {
    /// `base_url` is the admin endpoint including its scheme,
    /// e.g. `http://localhost:9644`.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(ADMIN_TIMEOUT)
            .build()
            .map_err(KeeperError::AdminClient)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn sync_local_state_url(&self, topic: &str, partition: i32) -> String {
        format!(
            "{}/v1/shadow_indexing/sync_local_state/{topic}/{partition}",
            self.base_url
        )
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn sync_local_state(&self, topic: &str, partition: i32) -> Result<()> {
        let url = self.sync_local_state_url(topic, partition);
        let sync_error = |message: String| KeeperError::AdminSync {
            topic: topic.to_string(),
            partition,
            message,
        };

        let resp = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| sync_error(e.to_string()))?;

        if resp.status().is_success() {
            tracing::debug!(url = %url, status = resp.status().as_u16(), "Synchronized local state");
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            Err(sync_error(format!("admin API returned {status}: {text}")))
        }
    }
}
