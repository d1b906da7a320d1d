//! Redis backed container registry.
//!
//! Layout: a set `<prefix>:containers` of every monitored container id, and
//! one string key `<prefix>:container:<id>` per container holding the job id.
//! Both writes go out in a single `MULTI` pipeline.

use std::fmt;

use error_stack::Report;
use error_stack::ResultExt;
use redis::aio::ConnectionManager;
use tracing::debug;
use tracing::info;

use crate::domain::CanonicalContainerId;
use crate::domain::ContainerRegistry;
use crate::domain::JobContainerBinding;
use crate::domain::RegistryError;

pub const DEFAULT_KEY_PREFIX: &str = "job_monitor";

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegistryKeys {
    prefix: String,
}

impl RegistryKeys {
    fn containers(&self) -> String {
        format!("{}:containers", self.prefix)
    }

    fn container_job(&self, container_id: &CanonicalContainerId) -> String {
        format!("{}:container:{}", self.prefix, container_id)
    }
}

#[derive(Clone)]
pub struct RedisContainerRegistry {
    conn: ConnectionManager,
    keys: RegistryKeys,
}

impl fmt::Debug for RedisContainerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisContainerRegistry")
            .field("connection", &"ConnectionManager")
            .field("keys", &self.keys)
            .finish()
    }
}

impl RedisContainerRegistry {
    pub async fn connect(
        redis_url: &str,
        key_prefix: &str,
    ) -> Result<Self, Report<RegistryError>> {
        info!("Connecting to Redis container registry at {redis_url}");

        let client = redis::Client::open(redis_url).change_context(
            RegistryError::ConnectionFailed {
                message: format!("invalid Redis URL: {redis_url}"),
            },
        )?;

        let conn = ConnectionManager::new(client)
            .await
            .change_context(RegistryError::ConnectionFailed {
                message: format!("failed to connect to {redis_url}"),
            })?;

        Ok(Self {
            conn,
            keys: RegistryKeys {
                prefix: key_prefix.to_string(),
            },
        })
    }
}

#[async_trait::async_trait]
impl ContainerRegistry for RedisContainerRegistry {
    async fn upsert(&self, binding: &JobContainerBinding) -> Result<(), Report<RegistryError>> {
        let container_key = self.keys.container_job(&binding.container_id);
        debug!("Registry SET: {container_key}");

        // ConnectionManager is a cheap handle over one multiplexed connection.
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .sadd(self.keys.containers(), binding.container_id.as_str())
            .ignore()
            .set(container_key, &binding.job_id)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .change_context(RegistryError::UpsertFailed {
                container_id: binding.container_id.to_string(),
                job_id: binding.job_id.clone(),
            })
    }
}
