use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, VerifyError};

/// Runtime configuration, read once at startup. Values come from the
/// process environment, with `.env` loaded beforehand by `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Absent means the in-memory job store is used.
    pub redis_url: Option<String>,
    /// Absent means the in-memory contact store is used.
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub contacts_collection: String,
    pub dns_timeout: Duration,
    pub dns_attempts: usize,
    pub smtp_timeout: Duration,
    pub smtp_port: u16,
    pub helo_domain: String,
    pub job_ttl_seconds: i64,
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| VerifyError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            redis_url: env::var("REDIS_URL").ok(),
            mongodb_uri: env::var("MONGODB_URI").ok(),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "email_verifier".to_string()),
            contacts_collection: env::var("CONTACTS_COLLECTION")
                .unwrap_or_else(|_| "contacts".to_string()),
            dns_timeout: Duration::from_secs(parse_var("DNS_TIMEOUT_SECS", 5)?),
            dns_attempts: parse_var("DNS_ATTEMPTS", 2)?,
            smtp_timeout: Duration::from_secs(parse_var("SMTP_TIMEOUT_SECS", 10)?),
            smtp_port: parse_var("SMTP_PROBE_PORT", 25)?,
            helo_domain: env::var("SMTP_HELO_DOMAIN")
                .unwrap_or_else(|_| "verify.example.com".to_string()),
            job_ttl_seconds: parse_var("JOB_TTL_SECS", 86_400)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_var_falls_back_to_default() {
        let port: u16 = parse_var("EMAIL_VERIFIER_TEST_UNSET_PORT", 2525).unwrap();
        assert_eq!(port, 2525);
    }

    #[test]
    fn test_set_var_is_parsed() {
        unsafe { env::set_var("EMAIL_VERIFIER_TEST_SET_PORT", "1587") };
        let port: u16 = parse_var("EMAIL_VERIFIER_TEST_SET_PORT", 25).unwrap();
        assert_eq!(port, 1587);
    }

    #[test]
    fn test_unparseable_var_is_a_config_error() {
        unsafe { env::set_var("EMAIL_VERIFIER_TEST_BAD_PORT", "not-a-number") };
        let result: Result<u16> = parse_var("EMAIL_VERIFIER_TEST_BAD_PORT", 25);
        assert!(matches!(result, Err(VerifyError::Config(_))));
    }
}
