//! Mapping of repository errors onto problem details.

use tenancy_errors::{Problem, catalog};
use tracing::error;

use crate::scoped::error::RepoError;

/// Problem details for `err` at request path `instance`.
///
/// Storage errors are logged here and replaced with a generic detail so that
/// driver messages never reach callers.
#[must_use]
pub fn repo_error_to_problem(err: &RepoError, instance: &str) -> Problem {
    let problem = match err {
        RepoError::MissingTenant(e) => catalog::MISSING_TENANT.as_problem(e.to_string()),
        RepoError::NotFound(_) => catalog::NOT_FOUND.as_problem(err.to_string()),
        RepoError::AlreadyExists(_) => catalog::ALREADY_EXISTS.as_problem(err.to_string()),
        RepoError::Validation(violations) => catalog::VALIDATION
            .as_problem("request failed validation")
            .with_errors(violations.clone()),
        RepoError::Persistence { message } => {
            error!(error = %message, instance, "storage failure");
            catalog::INTERNAL.as_problem("An internal error occurred")
        }
    };
    problem.with_instance(instance)
}

impl From<RepoError> for Problem {
    fn from(err: RepoError) -> Self {
        repo_error_to_problem(&err, "")
    }
}
