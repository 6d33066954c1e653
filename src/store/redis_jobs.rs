use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use super::JobStore;
use crate::error::Result;
use crate::models::VerificationJob;

fn job_key(job_id: &str) -> String {
    format!("job:{}", job_id)
}

/// Job store backed by Redis. Each job is one JSON document under
/// `job:{id}` with a TTL so finished jobs age out on their own.
pub struct RedisJobStore {
    redis: Arc<Client>,
    ttl_seconds: i64,
}

impl RedisJobStore {
    pub fn new(redis_url: &str, ttl_seconds: i64) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            redis: Arc::new(client),
            ttl_seconds,
        })
    }

    async fn write(&self, job: &VerificationJob) -> Result<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let job_json = serde_json::to_string(job)?;

        let _: () = conn.set(job_key(&job.id), &job_json).await?;
        let _: () = conn.expire(job_key(&job.id), self.ttl_seconds).await?;

        Ok(())
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn create(&self, job: &VerificationJob) -> Result<()> {
        self.write(job).await
    }

    async fn fetch(&self, job_id: &str) -> Result<Option<VerificationJob>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let job_json: Option<String> = conn.get(job_key(job_id)).await?;

        match job_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, job: &VerificationJob) -> Result<()> {
        self.write(job).await
    }
}
