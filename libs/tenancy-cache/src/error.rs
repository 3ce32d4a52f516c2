use tenancy_security::TenantError;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    MissingTenant(#[from] TenantError),

    /// The stored bytes do not decode as the requested type.
    #[error("cached value for key '{key}' is corrupted: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for key '{key}' cannot be serialized: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
