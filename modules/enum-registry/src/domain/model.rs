use serde::{Deserialize, Serialize};
use tenancy_errors::{Rule, ValidationViolation, Violations};

/// One enumeration value as returned to callers and kept in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDto {
    pub id: String,
    pub name: String,
}

/// Body of create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInput {
    pub name: String,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl From<bool> for DeleteResponse {
    fn from(deleted: bool) -> Self {
        Self { deleted }
    }
}

/// Longest accepted display name.
pub const MAX_NAME_LEN: usize = 128;

impl EnumInput {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Names must be non-empty and free of special characters other than `-`.
    ///
    /// # Errors
    /// Every violated rule, in order.
    pub fn validate(&self) -> Result<(), Vec<ValidationViolation>> {
        let mut violations = Violations::new();
        violations.check(
            "name",
            &self.name,
            &[
                Rule::NotEmpty,
                Rule::NoSpecialChars { allow: "-" },
                Rule::MaxLen(MAX_NAME_LEN),
            ],
        );
        violations.into_result()
    }
}

/// Id derived from a display name: spaces become underscores, then lowercase.
///
/// `"US Dollar"` becomes `"us_dollar"`.
#[must_use]
pub fn enum_id_from_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}
