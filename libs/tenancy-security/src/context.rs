use http::HeaderMap;
use http::header::AUTHORIZATION;
use tracing::debug;

use crate::error::TenantError;
use crate::secret::SecretString;
use crate::tenant_id::TenantId;

/// Header consulted for the tenant id when none is configured.
pub const DEFAULT_TENANT_HEADER: &str = "TenantId";

/// Anything that can name the tenant a data-access call acts for.
pub trait TenantSource {
    /// # Errors
    /// Returns [`TenantError::MissingTenant`] when no tenant is known.
    fn current_tenant_id(&self) -> Result<TenantId, TenantError>;
}

/// Per-request tenant information.
///
/// Built once from the inbound headers and then passed by reference to every
/// repository and cache call for that request. Cloning is cheap enough to hand
/// a copy to spawned work.
#[derive(Clone, Debug)]
pub struct TenantContext {
    tenant_id: Option<TenantId>,
    tenant_header: String,
    auth_token: Option<SecretString>,
}

impl TenantContext {
    /// Read the tenant id from `tenant_header` and the bearer token from
    /// `Authorization`.
    ///
    /// Header names are case-insensitive. A missing, non-UTF-8, or blank
    /// tenant header leaves the context anonymous.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, tenant_header: &str) -> Self {
        let tenant_id = headers
            .get(tenant_header)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| TenantId::parse(raw).ok());

        let auth_token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw).trim())
            .filter(|token| !token.is_empty())
            .map(SecretString::new);

        if tenant_id.is_none() {
            debug!(header = tenant_header, "request carries no tenant id");
        }

        Self {
            tenant_id,
            tenant_header: tenant_header.to_owned(),
            auth_token,
        }
    }

    /// Like [`from_headers`](Self::from_headers) but rejects requests without
    /// a tenant. This is the request-level guard for tenant-only endpoints.
    ///
    /// # Errors
    /// Returns [`TenantError::MissingTenant`] when the tenant header is absent or blank.
    pub fn require(headers: &HeaderMap, tenant_header: &str) -> Result<Self, TenantError> {
        let ctx = Self::from_headers(headers, tenant_header);
        ctx.resolve()?;
        Ok(ctx)
    }

    /// Context for background work acting on behalf of a known tenant.
    #[must_use]
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            tenant_header: DEFAULT_TENANT_HEADER.to_owned(),
            auth_token: None,
        }
    }

    /// Context with no tenant. Only unscoped entities are reachable through it.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            tenant_id: None,
            tenant_header: DEFAULT_TENANT_HEADER.to_owned(),
            auth_token: None,
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// The tenant this request acts for.
    ///
    /// # Errors
    /// Returns [`TenantError::MissingTenant`] naming the configured header when
    /// the request carried no tenant.
    pub fn resolve(&self) -> Result<&TenantId, TenantError> {
        self.tenant_id
            .as_ref()
            .ok_or_else(|| TenantError::MissingTenant {
                header: self.tenant_header.clone(),
            })
    }

    #[must_use]
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<&SecretString> {
        self.auth_token.as_ref()
    }

    #[must_use]
    pub fn tenant_header(&self) -> &str {
        &self.tenant_header
    }
}

impl TenantSource for TenantContext {
    fn current_tenant_id(&self) -> Result<TenantId, TenantError> {
        self.resolve().cloned()
    }
}
