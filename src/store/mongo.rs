use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::{ContactStatus, ContactStore};
use crate::error::Result;

/// Upper bound on addresses per `$in` lookup query.
const LOOKUP_CHUNK: usize = 30;

/// Upper bound on addresses per status `update_many`.
const UPDATE_CHUNK: usize = 500;

/// Shape of a contact document in the contacts collection. Fields beyond
/// these exist in real documents and are left untouched.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactDocument {
    pub email: String,
    pub status: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Contact store backed by a MongoDB collection. Reads and writes are
/// chunked so one oversized bulk request cannot produce an unbounded
/// query document.
pub struct MongoContactStore {
    collection: Collection<ContactDocument>,
}

impl MongoContactStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    async fn filter_pending(&self, emails: &[String]) -> Result<Vec<String>> {
        let mut pending = Vec::new();
        for chunk in emails.chunks(LOOKUP_CHUNK) {
            let filter = doc! {
                "email": { "$in": chunk.to_vec() },
                "status": ContactStatus::Pending.as_str(),
            };
            let mut cursor = self.collection.find(filter).await?;
            let mut found = HashSet::new();
            while let Some(contact) = cursor.try_next().await? {
                found.insert(contact.email);
            }
            // Collection order is unspecified; re-emit in caller order
            pending.extend(chunk.iter().filter(|email| found.contains(*email)).cloned());
        }
        Ok(pending)
    }

    async fn find_pending_by_source(&self, source: &str) -> Result<Vec<String>> {
        let filter = doc! {
            "source": source,
            "status": ContactStatus::Pending.as_str(),
        };
        let mut cursor = self.collection.find(filter).await?;
        let mut emails = Vec::new();
        while let Some(contact) = cursor.try_next().await? {
            emails.push(contact.email);
        }
        Ok(emails)
    }

    async fn mark_verifying(&self, emails: &[String]) -> Result<()> {
        for chunk in emails.chunks(UPDATE_CHUNK) {
            let filter = doc! { "email": { "$in": chunk.to_vec() } };
            let update = doc! { "$set": { "status": ContactStatus::Verifying.as_str() } };
            self.collection.update_many(filter, update).await?;
        }
        Ok(())
    }

    async fn set_status(&self, email: &str, status: ContactStatus) -> Result<()> {
        let filter = doc! { "email": email };
        let update = doc! { "$set": { "status": status.as_str() } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_sizes_stay_within_query_limits() {
        assert_eq!(LOOKUP_CHUNK, 30);
        assert_eq!(UPDATE_CHUNK, 500);
    }

    #[test]
    fn test_contact_document_tolerates_missing_source() {
        let doc: ContactDocument =
            serde_json::from_str(r#"{"email":"a@example.com","status":"pending"}"#).unwrap();
        assert_eq!(doc.email, "a@example.com");
        assert_eq!(doc.source, None);
    }
}
