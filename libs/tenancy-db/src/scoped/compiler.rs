use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition};
use tenancy_security::{TenantContext, TenantError};
use tracing::warn;

use crate::scoped::entity_traits::ScopableEntity;
use crate::scoped::filters::Filters;

/// Produces the tenant predicate for an entity.
///
/// Kept behind a trait so a provider that expands a tenant into a set of
/// effective tenants can replace [`SimpleTenantFilter`] without touching
/// callers.
pub trait TenantFilterProvider {
    /// `Ok(None)` for unscoped entities. A scoped entity without a tenant
    /// column gets a condition that matches no row.
    ///
    /// # Errors
    /// Returns [`TenantError::MissingTenant`] if the entity is scoped and the
    /// context has no tenant.
    fn tenant_condition<E>(ctx: &TenantContext) -> Result<Option<Condition>, TenantError>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy;
}

/// `tenant_col = <ctx tenant>`.
pub struct SimpleTenantFilter;

impl TenantFilterProvider for SimpleTenantFilter {
    fn tenant_condition<E>(ctx: &TenantContext) -> Result<Option<Condition>, TenantError>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
    {
        if E::IS_UNSCOPED {
            return Ok(None);
        }
        let tenant = ctx.resolve()?;
        let Some(tcol) = E::tenant_col() else {
            // Scoped but nowhere to filter on: match nothing.
            warn!(
                entity = std::any::type_name::<E>(),
                "scoped entity has no tenant column, denying all rows"
            );
            return Ok(Some(Condition::all().add(Expr::value(false))));
        };
        Ok(Some(
            Condition::all().add(Expr::col(tcol).eq(tenant.as_str())),
        ))
    }
}

/// Turns caller filters into the single predicate a query runs with.
pub struct FilterCompiler;

impl FilterCompiler {
    /// AND of every caller filter followed by the tenant predicate.
    ///
    /// Pure: touches no storage, so a missing tenant is reported before any
    /// query is built. The result is an empty `Condition::all()` (no
    /// restriction) only for unscoped entities with no filters.
    ///
    /// # Errors
    /// Returns [`TenantError::MissingTenant`] for scoped entities when the
    /// context has no tenant.
    pub fn compile<E>(ctx: &TenantContext, filters: Filters<E>) -> Result<Condition, TenantError>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
    {
        Self::compile_with::<E, SimpleTenantFilter>(ctx, filters)
    }

    /// [`compile`](Self::compile) with an explicit tenant provider.
    ///
    /// # Errors
    /// Whatever the provider reports.
    pub fn compile_with<E, P>(ctx: &TenantContext, filters: Filters<E>) -> Result<Condition, TenantError>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
        P: TenantFilterProvider,
    {
        // Resolve first so a missing tenant wins over any filter shape.
        let tenant = P::tenant_condition::<E>(ctx)?;
        let cond = filters.into_condition();
        Ok(match tenant {
            Some(tenant) => cond.add(tenant),
            None => cond,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};
    use tenancy_security::TenantId;

    use super::*;

    mod doc {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "docs")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub tenant_id: String,
            pub title: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod country {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "countries")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub code: String,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod memo {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "memos")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub tenant_id: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    // Claims tenant scoping but names no tenant column.
    impl ScopableEntity for memo::Entity {
        fn tenant_col() -> Option<Self::Column> {
            None
        }
    }

    impl ScopableEntity for doc::Entity {
        fn tenant_col() -> Option<Self::Column> {
            Some(doc::Column::TenantId)
        }
    }

    impl ScopableEntity for country::Entity {
        const IS_UNSCOPED: bool = true;

        fn tenant_col() -> Option<Self::Column> {
            None
        }
    }

    fn acme() -> TenantContext {
        TenantContext::for_tenant(TenantId::parse("acme").unwrap())
    }

    fn sql_for<E: EntityTrait>(cond: Condition) -> String {
        E::find().filter(cond).build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn tenant_predicate_is_appended_after_caller_filters() {
        let filters = Filters::new().and(Expr::col(doc::Column::Title).eq("draft"));
        let sql = sql_for::<doc::Entity>(
            FilterCompiler::compile::<doc::Entity>(&acme(), filters).unwrap(),
        );

        let title = sql.find(r#""title" = 'draft'"#).unwrap();
        let tenant = sql.find(r#""tenant_id" = 'acme'"#).unwrap();
        assert!(title < tenant, "{sql}");
    }

    #[test]
    fn no_filters_still_scopes_by_tenant() {
        let cond = FilterCompiler::compile::<doc::Entity>(&acme(), Filters::new()).unwrap();
        assert!(!cond.is_empty());
        assert!(sql_for::<doc::Entity>(cond).contains(r#""tenant_id" = 'acme'"#));
    }

    #[test]
    fn or_filter_stays_inside_the_tenant_and() {
        let widening = Condition::any()
            .add(Expr::col(doc::Column::TenantId).eq("globex"))
            .add(Expr::value(true));
        let sql = sql_for::<doc::Entity>(
            FilterCompiler::compile::<doc::Entity>(&acme(), Filters::new().and(widening)).unwrap(),
        );
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains(r#") AND "tenant_id" = 'acme'"#), "{sql}");
    }

    #[test]
    fn missing_tenant_fails_for_scoped_entity() {
        let err = FilterCompiler::compile::<doc::Entity>(&TenantContext::anonymous(), Filters::new())
            .unwrap_err();
        assert!(matches!(err, TenantError::MissingTenant { .. }));
    }

    #[test]
    fn unscoped_entity_needs_no_tenant() {
        let cond =
            FilterCompiler::compile::<country::Entity>(&TenantContext::anonymous(), Filters::new())
                .unwrap();
        assert!(cond.is_empty());

        let filtered = FilterCompiler::compile::<country::Entity>(
            &TenantContext::anonymous(),
            Filters::new().and(Expr::col(country::Column::Code).eq("DE")),
        )
        .unwrap();
        let sql = sql_for::<country::Entity>(filtered);
        assert!(sql.contains(r#""code" = 'DE'"#), "{sql}");
        assert!(!sql.contains("tenant"), "{sql}");
    }

    #[test]
    fn scoped_entity_without_tenant_column_is_denied() {
        let err = FilterCompiler::compile::<memo::Entity>(&TenantContext::anonymous(), Filters::new())
            .unwrap_err();
        assert!(matches!(err, TenantError::MissingTenant { .. }));

        let cond = FilterCompiler::compile::<memo::Entity>(
            &acme(),
            Filters::new().and(Expr::col(memo::Column::Id).eq("m1")),
        )
        .unwrap();
        assert!(!cond.is_empty());
        let sql = sql_for::<memo::Entity>(cond);
        assert!(sql.contains(r#""id" = 'm1'"#), "{sql}");
        assert!(!sql.contains("tenant_id\" ="), "{sql}");
        assert!(sql.to_uppercase().contains("FALSE"), "{sql}");
    }
}
