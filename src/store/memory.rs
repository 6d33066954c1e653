use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContactStatus, ContactStore, JobStore};
use crate::error::Result;
use crate::models::VerificationJob;

struct ContactRecord {
    status: ContactStatus,
    source: Option<String>,
}

/// Contact store held in process memory. Backs tests and lets the
/// service run without a MongoDB instance.
#[derive(Default)]
pub struct InMemoryContactStore {
    contacts: RwLock<HashMap<String, ContactRecord>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, email: &str, status: ContactStatus, source: Option<&str>) {
        self.contacts.write().await.insert(
            email.to_string(),
            ContactRecord {
                status,
                source: source.map(str::to_string),
            },
        );
    }

    pub async fn status_of(&self, email: &str) -> Option<ContactStatus> {
        self.contacts
            .read()
            .await
            .get(email)
            .map(|record| record.status)
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn filter_pending(&self, emails: &[String]) -> Result<Vec<String>> {
        let contacts = self.contacts.read().await;
        Ok(emails
            .iter()
            .filter(|email| {
                contacts
                    .get(email.as_str())
                    .is_some_and(|record| record.status == ContactStatus::Pending)
            })
            .cloned()
            .collect())
    }

    async fn find_pending_by_source(&self, source: &str) -> Result<Vec<String>> {
        let contacts = self.contacts.read().await;
        let mut found: Vec<String> = contacts
            .iter()
            .filter(|(_, record)| {
                record.status == ContactStatus::Pending
                    && record.source.as_deref() == Some(source)
            })
            .map(|(email, _)| email.clone())
            .collect();
        found.sort();
        Ok(found)
    }

    async fn mark_verifying(&self, emails: &[String]) -> Result<()> {
        let mut contacts = self.contacts.write().await;
        for email in emails {
            if let Some(record) = contacts.get_mut(email) {
                record.status = ContactStatus::Verifying;
            }
        }
        Ok(())
    }

    async fn set_status(&self, email: &str, status: ContactStatus) -> Result<()> {
        let mut contacts = self.contacts.write().await;
        if let Some(record) = contacts.get_mut(email) {
            record.status = status;
        }
        Ok(())
    }
}

/// Job store held in process memory.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, VerificationJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &VerificationJob) -> Result<()> {
        self.jobs.write().await.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn fetch(&self, job_id: &str) -> Result<Option<VerificationJob>> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn update(&self, job: &VerificationJob) -> Result<()> {
        self.jobs.write().await.insert(job.id.clone(), job.clone());
        Ok(())
    }
}
