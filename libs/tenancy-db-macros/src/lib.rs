//! # tenancy-db-macros
//!
//! `#[derive(Scopable)]` implements the `tenancy_db::scoped` capability traits
//! for a `SeaORM` entity from a `#[tenancy(...)]` attribute on its `Model`.
//!
//! Every dimension needs an explicit decision; there are no defaults.
//!
//! | Dimension  | Choose one                                                      |
//! |------------|-----------------------------------------------------------------|
//! | tenant     | `tenant_col = "col"` or `unscoped`                              |
//! | id         | `id_col = "col"` or `no_id`                                     |
//! | timestamps | `timestamps`, `created_at = "a", updated_at = "b"`, or `no_timestamps` |
//!
//! ```ignore
//! #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
//! #[sea_orm(table_name = "notes")]
//! #[tenancy(tenant_col = "tenant_id", id_col = "id", timestamps)]
//! pub struct Model { /* ... */ }
//! ```

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod scopable;

/// Implement `ScopableEntity`, and optionally `IdentifiedEntity` and
/// `TimestampedEntity`, for the `Entity` in the same module.
#[proc_macro_derive(Scopable, attributes(tenancy))]
#[proc_macro_error]
pub fn derive_scopable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    scopable::expand(&input).into()
}
