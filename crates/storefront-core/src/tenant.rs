//! Tenant identifiers and hostname normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Identifier of a store (tenant).
///
/// Persisted as an integer primary key. Only positive values identify a
/// real store; `0` is the "not yet inserted" value of a fresh record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StoreId(i64);

impl StoreId {
    /// Create a store ID from a raw integer
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw integer value
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Check that this ID can identify a persisted store
    pub fn validate(self) -> Result<Self> {
        if self.0 > 0 {
            Ok(self)
        } else {
            Err(Error::InvalidStore(format!(
                "store id must be positive, got {}",
                self.0
            )))
        }
    }
}

impl From<i64> for StoreId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|e| Error::InvalidStore(format!("Invalid store ID format: {}", e)))?;
        Self(id).validate()
    }
}

/// Normalized hostname used as a registry key.
///
/// Normalization lowercases ASCII letters, trims whitespace and a trailing
/// dot, and drops a `:port` suffix, so `Shop.Example.com:8080` and
/// `shop.example.com` address the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostName(String);

impl HostName {
    /// Parse and normalize a hostname (or a `Host` header value)
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let without_port = strip_port(trimmed);
        let normalized = without_port.trim_end_matches('.').to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(Error::InvalidHost(format!("empty hostname: {:?}", raw)));
        }
        if normalized.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(Error::InvalidHost(format!("malformed hostname: {:?}", raw)));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HostName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Remove a `:port` suffix, leaving bracketed IPv6 literals intact
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}
