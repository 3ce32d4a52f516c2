use sea_orm::EntityTrait;

/// Declares whether and how an entity is partitioned by tenant.
///
/// Both answers must be given explicitly, either by hand or through
/// `#[tenancy(tenant_col = "...")]` / `#[tenancy(unscoped)]` on the derive.
///
/// ```rust,ignore
/// impl ScopableEntity for note::Entity {
///     fn tenant_col() -> Option<Self::Column> {
///         Some(note::Column::TenantId)
///     }
/// }
/// ```
pub trait ScopableEntity: EntityTrait {
    /// Shared reference data visible to every tenant.
    ///
    /// When true, [`tenant_col`](Self::tenant_col) returns `None` and no tenant
    /// predicate is ever added.
    const IS_UNSCOPED: bool = false;

    /// Column holding the owning tenant's id. The column must store a string.
    ///
    /// Returning `None` without setting `IS_UNSCOPED` makes every read match
    /// nothing and every insert fail.
    fn tenant_col() -> Option<Self::Column>;
}

/// Entities addressable by a single id column (used by delete).
pub trait IdentifiedEntity: EntityTrait {
    fn id_col() -> Self::Column;
}

/// Entities with repository-managed audit timestamps.
///
/// Both columns must be `DateTimeUtc`. `created_at` is written once on insert
/// and never changes; `updated_at` never moves backwards.
pub trait TimestampedEntity: EntityTrait {
    fn created_at_col() -> Self::Column;
    fn updated_at_col() -> Self::Column;
}
