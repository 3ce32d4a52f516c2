//! Static error definitions for the tenant-scoped data layer.

use http::StatusCode;

use crate::problem::Problem;

/// Static error definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Build a [`Problem`] for one occurrence of this error.
    #[inline]
    #[must_use]
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Problem::new(status, self.title, detail.into())
            .with_code(self.code)
            .with_type(self.type_url)
    }
}

pub const MISSING_TENANT: ErrDef = ErrDef {
    status: 400,
    title: "Missing Tenant",
    code: "TENANCY_MISSING_TENANT",
    type_url: "urn:cyberfabric:tenancy:missing-tenant",
};

pub const NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not Found",
    code: "TENANCY_NOT_FOUND",
    type_url: "urn:cyberfabric:tenancy:not-found",
};

pub const ALREADY_EXISTS: ErrDef = ErrDef {
    status: 409,
    title: "Already Exists",
    code: "TENANCY_ALREADY_EXISTS",
    type_url: "urn:cyberfabric:tenancy:already-exists",
};

pub const VALIDATION: ErrDef = ErrDef {
    status: 422,
    title: "Validation Failed",
    code: "TENANCY_VALIDATION",
    type_url: "urn:cyberfabric:tenancy:validation",
};

/// Storage and cache failures. The detail shown to callers is always generic.
pub const INTERNAL: ErrDef = ErrDef {
    status: 500,
    title: "Internal Server Error",
    code: "TENANCY_INTERNAL",
    type_url: "urn:cyberfabric:tenancy:internal",
};
