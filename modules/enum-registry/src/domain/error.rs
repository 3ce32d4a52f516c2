use tenancy_cache::CacheError;
use tenancy_db::RepoError;
use tenancy_errors::ValidationViolation;
use tenancy_security::TenantError;

#[derive(thiserror::Error, Debug)]
pub enum EnumError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<TenantError> for EnumError {
    fn from(err: TenantError) -> Self {
        Self::Repo(RepoError::MissingTenant(err))
    }
}

impl From<Vec<ValidationViolation>> for EnumError {
    fn from(violations: Vec<ValidationViolation>) -> Self {
        Self::Repo(RepoError::Validation(violations))
    }
}
