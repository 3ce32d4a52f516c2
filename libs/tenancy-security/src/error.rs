/// Failure to resolve the tenant of the current request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    /// The configured tenant header was absent or blank.
    #[error("no tenant identifier was provided in header '{header}'")]
    MissingTenant { header: String },
}

/// Rejected attempt to build a [`TenantId`](crate::TenantId) from a blank string.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("tenant id must not be blank")]
pub struct InvalidTenantId;
