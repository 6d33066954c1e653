use async_trait::async_trait;
use mockall::automock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

use crate::error::Result;

/// One MX record as returned by a lookup, before preference ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxEntry {
    pub preference: u16,
    pub exchange: String,
}

/// The DNS seam. Production uses [`DnsMxLookup`]; tests inject a mock so
/// resolution behavior is exercised without the network.
#[automock]
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxEntry>>;
}

/// MX lookup backed by trust-dns with a bounded per-request timeout.
pub struct DnsMxLookup {
    resolver: TokioAsyncResolver,
}

impl DnsMxLookup {
    pub fn new(timeout: Duration, attempts: usize) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = attempts;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl MxLookup for DnsMxLookup {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxEntry>> {
        let lookup = self.resolver.mx_lookup(domain).await?;
        Ok(lookup
            .iter()
            .map(|mx| MxEntry {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
            })
            .collect())
    }
}

/// Cached resolution state for one domain. `mx_records` holds exchange
/// hostnames in preference order, best first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub valid: bool,
    pub mx_records: Vec<String>,
}

impl DomainRecord {
    pub fn no_mail_server() -> Self {
        Self {
            valid: false,
            mx_records: Vec::new(),
        }
    }

    /// The host a probe should connect to.
    pub fn primary_mx(&self) -> Option<&str> {
        self.mx_records.first().map(String::as_str)
    }
}

/// Per-batch DNS cache, keyed by lowercased domain. Entries never expire
/// and negative results are cached too; the cache lives only as long as
/// the batch that owns it. Callers pass it into [`MxResolver::resolve`]
/// explicitly, which keeps one writer per batch by construction.
#[derive(Debug, Default)]
pub struct DomainCache {
    entries: HashMap<String, DomainRecord>,
}

impl DomainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&DomainRecord> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, record: DomainRecord) {
        self.entries.insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves recipient domains to their mail servers through the cache.
pub struct MxResolver {
    lookup: Arc<dyn MxLookup>,
}

impl MxResolver {
    pub fn new(lookup: Arc<dyn MxLookup>) -> Self {
        Self { lookup }
    }

    /// Cache-first resolution. On a miss, one MX lookup runs and its
    /// outcome is written back, whether positive or negative. A lookup
    /// error is recorded the same way as an empty answer; there is no
    /// retry, so a domain is asked about at most once per batch.
    pub async fn resolve(&self, domain: &str, cache: &mut DomainCache) -> DomainRecord {
        let key = domain.to_lowercase();

        if let Some(record) = cache.get(&key) {
            debug!(target: "mx_resolver", domain = %key, "domain cache hit");
            return record.clone();
        }

        let record = match self.lookup.lookup_mx(&key).await {
            Ok(entries) if !entries.is_empty() => {
                let mut entries = entries;
                entries.sort_by(|a, b| {
                    a.preference
                        .cmp(&b.preference)
                        .then_with(|| a.exchange.cmp(&b.exchange))
                });
                DomainRecord {
                    valid: true,
                    mx_records: entries.into_iter().map(|e| e.exchange).collect(),
                }
            }
            Ok(_) => {
                debug!(target: "mx_resolver", domain = %key, "no MX records");
                DomainRecord::no_mail_server()
            }
            Err(err) => {
                debug!(target: "mx_resolver", domain = %key, error = %err, "MX lookup failed");
                DomainRecord::no_mail_server()
            }
        };

        cache.insert(key, record.clone());
        record
    }
}
