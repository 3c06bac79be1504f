use async_trait::async_trait;

use crate::stain_pipeline::common::error::Result;

/// Durable string key-value storage supplied by the environment.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
