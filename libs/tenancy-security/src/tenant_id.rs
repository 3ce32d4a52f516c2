use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidTenantId;

/// Opaque tenant identifier as carried by the tenant header.
///
/// Never blank and never padded with whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Parse a raw header value, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`InvalidTenantId`] if nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, InvalidTenantId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidTenantId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = InvalidTenantId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for TenantId {
    type Error = InvalidTenantId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id = TenantId::parse("  acme ").unwrap();
        assert_eq!(id.as_str(), "acme");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(TenantId::parse(""), Err(InvalidTenantId));
        assert_eq!(TenantId::parse("   "), Err(InvalidTenantId));
    }

    #[test]
    fn serde_is_transparent_string() {
        let id = TenantId::parse("acme").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"acme\"");

        let back: TenantId = serde_json::from_str("\"acme\"").unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<TenantId>("\"  \"").is_err());
    }
}
