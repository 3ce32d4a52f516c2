//! Tenant-scoped query building and CRUD.
//!
//! Every query issued through this module for a tenant-scoped entity carries
//! a `tenant_col = <current tenant>` predicate, ANDed after whatever the
//! caller asked for. Callers describe *what* they want with [`Filters`]; they
//! never see or assemble the tenant predicate themselves.
//!
//! Entities opt in by implementing the capability traits in
//! [`entity_traits`], usually through `#[derive(Scopable)]`:
//!
//! ```rust,ignore
//! #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
//! #[sea_orm(table_name = "notes")]
//! #[tenancy(tenant_col = "tenant_id", id_col = "id", timestamps)]
//! pub struct Model {
//!     #[sea_orm(primary_key, auto_increment = false)]
//!     pub id: String,
//!     pub tenant_id: String,
//!     pub title: String,
//!     pub created_at: DateTimeUtc,
//!     pub updated_at: DateTimeUtc,
//! }
//! ```

pub mod compiler;
pub mod condition;
pub mod entity_traits;
pub mod error;
pub mod filters;
pub mod page;
pub mod problem;
pub mod repository;

pub use compiler::{FilterCompiler, SimpleTenantFilter, TenantFilterProvider};
pub use condition::InsertCondition;
pub use entity_traits::{IdentifiedEntity, ScopableEntity, TimestampedEntity};
pub use error::RepoError;
pub use filters::Filters;
pub use page::{Counted, Page};
pub use problem::repo_error_to_problem;
pub use repository::TenantRepository;

#[cfg(feature = "macros")]
pub use tenancy_db_macros::Scopable;
