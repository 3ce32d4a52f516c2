use sea_orm::{ActiveModelTrait, DbErr, Value};
use tenancy_db::scoped::{IdentifiedEntity, ScopableEntity, TimestampedEntity};

use crate::domain::model::EnumDto;

/// A table of enumeration values: string id, display name, owning tenant
/// and audit timestamps.
///
/// ```rust,ignore
/// #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
/// #[sea_orm(table_name = "currencies")]
/// #[tenancy(tenant_col = "tenant_id", id_col = "id", timestamps)]
/// pub struct Model {
///     #[sea_orm(primary_key, auto_increment = false)]
///     pub tenant_id: String,
///     #[sea_orm(primary_key, auto_increment = false)]
///     pub id: String,
///     pub name: String,
///     pub created_at: DateTimeUtc,
///     pub updated_at: DateTimeUtc,
/// }
///
/// impl EnumEntity for Entity {
///     fn name_col() -> Column { Column::Name }
///     fn to_dto(m: &Model) -> EnumDto { EnumDto { id: m.id.clone(), name: m.name.clone() } }
/// }
/// ```
pub trait EnumEntity: ScopableEntity + IdentifiedEntity + TimestampedEntity {
    fn name_col() -> Self::Column;

    fn to_dto(model: &Self::Model) -> EnumDto;

    /// Candidate row for a new value. The tenant and timestamps are stamped by
    /// the repository.
    ///
    /// # Errors
    /// `DbErr::Type` if the id or name column does not hold a string.
    fn new_active(id: String, name: String) -> Result<Self::ActiveModel, DbErr> {
        let mut active = <Self::ActiveModel as ActiveModelTrait>::default();
        active.try_set(Self::id_col(), Value::from(id))?;
        active.try_set(Self::name_col(), Value::from(name))?;
        Ok(active)
    }
}
