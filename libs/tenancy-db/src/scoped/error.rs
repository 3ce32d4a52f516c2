use sea_orm::DbErr;
use tenancy_errors::ValidationViolation;
use tenancy_security::TenantError;

/// Failure of a tenant-scoped repository operation.
#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    /// A tenant-scoped operation ran without a tenant.
    #[error(transparent)]
    MissingTenant(#[from] TenantError),

    /// The scoped lookup found nothing. Carries the caller's description.
    #[error("{0} does not exist in the database")]
    NotFound(String),

    /// An insert condition rejected the candidate.
    #[error("{0} already exists in the database")]
    AlreadyExists(String),

    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<ValidationViolation>),

    /// Storage failure. The message is for logs, not for callers.
    #[error("persistence error: {message}")]
    Persistence { message: String },
}

impl RepoError {
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    #[must_use]
    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<DbErr> for RepoError {
    fn from(err: DbErr) -> Self {
        Self::Persistence {
            message: err.to_string(),
        }
    }
}

impl From<Vec<ValidationViolation>> for RepoError {
    fn from(violations: Vec<ValidationViolation>) -> Self {
        Self::Validation(violations)
    }
}
