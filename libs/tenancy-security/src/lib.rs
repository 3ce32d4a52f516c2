#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Tenant context for tenant-scoped data access.
//!
//! A [`TenantContext`] is built once per inbound request from its headers and
//! handed to every data-access call made on behalf of that request. It never
//! fails on construction: a missing tenant is only an error when a
//! tenant-scoped operation asks for it via [`TenantContext::resolve`].

pub mod context;
pub mod error;
pub mod secret;
pub mod tenant_id;

pub use context::{DEFAULT_TENANT_HEADER, TenantContext, TenantSource};
pub use error::{InvalidTenantId, TenantError};
pub use secret::SecretString;
pub use tenant_id::TenantId;
