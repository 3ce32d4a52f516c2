#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Tenant-scoped registry of named enumeration values.
//!
//! Each tenant keeps its own list per enumeration table (currencies, units,
//! document kinds, ...). Reads go through the tenant cache first; every write
//! goes to the database and then updates the cached list.

pub mod api;
pub mod domain;
pub mod infra;

pub use api::error::enum_error_to_problem;
pub use domain::error::EnumError;
pub use domain::model::{DeleteResponse, EnumDto, EnumInput, enum_id_from_name};
pub use domain::service::EnumService;
pub use infra::storage::entity::EnumEntity;
