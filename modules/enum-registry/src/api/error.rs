use tenancy_cache::CacheError;
use tenancy_db::scoped::repo_error_to_problem;
use tenancy_errors::{Problem, catalog};

use crate::domain::error::EnumError;

/// Map a registry error to problem details for request path `instance`.
#[must_use]
pub fn enum_error_to_problem(e: &EnumError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        EnumError::Repo(err) => repo_error_to_problem(err, instance),
        EnumError::Cache(CacheError::MissingTenant(err)) => catalog::MISSING_TENANT
            .as_problem(err.to_string())
            .with_instance(instance),
        EnumError::Cache(err) => {
            tracing::error!(error = %err, "cache failure");
            catalog::INTERNAL
                .as_problem("An internal error occurred")
                .with_instance(instance)
        }
    };

    match trace_id {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    }
}

impl From<EnumError> for Problem {
    fn from(e: EnumError) -> Self {
        enum_error_to_problem(&e, "/")
    }
}
