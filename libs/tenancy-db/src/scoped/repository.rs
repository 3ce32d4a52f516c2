use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ValueType};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityName, EntityTrait, IdenStatic, IntoActiveModel, Iterable, ModelTrait, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, Select, TransactionTrait, Value,
};
use tenancy_security::{TenantContext, TenantId};
use tracing::{debug, info, instrument, warn};

use crate::scoped::compiler::FilterCompiler;
use crate::scoped::condition::{ConflictCheck, InsertCondition};
use crate::scoped::entity_traits::{IdentifiedEntity, ScopableEntity, TimestampedEntity};
use crate::scoped::error::RepoError;
use crate::scoped::filters::Filters;
use crate::scoped::page::{Counted, Page};

/// Generic tenant-scoped CRUD for entity `E`.
///
/// Holds no per-request state: the [`TenantContext`] is passed to each call,
/// so one repository can serve any number of requests. Every read, count,
/// update and delete runs through [`FilterCompiler`]; inserts stamp the
/// tenant column themselves. Lists are ordered by primary key.
///
/// Writes run in a transaction of their own and commit exactly once.
pub struct TenantRepository<E> {
    conn: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for TenantRepository<E> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for TenantRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantRepository")
            .field("entity", &std::any::type_name::<E>())
            .finish_non_exhaustive()
    }
}

fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

impl<E: EntityTrait> TenantRepository<E> {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }
}

impl<E> TenantRepository<E>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
    E::Model: Send + Sync,
{
    /// Every visible row matching `filters`, mapped through `transform`.
    ///
    /// # Errors
    /// `MissingTenant` for scoped entities without a tenant, `Persistence` on storage failure.
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn get_all<R, F>(
        &self,
        ctx: &TenantContext,
        transform: F,
        filters: Filters<E>,
    ) -> Result<Vec<R>, RepoError>
    where
        F: FnMut(E::Model) -> R,
    {
        self.get_page(ctx, Page::default(), transform, filters).await
    }

    /// One window of [`get_all`](Self::get_all).
    ///
    /// # Errors
    /// See [`get_all`](Self::get_all).
    #[instrument(skip_all, fields(entity = %entity_name::<E>(), limit = ?page.limit, offset = ?page.offset))]
    pub async fn get_page<R, F>(
        &self,
        ctx: &TenantContext,
        page: Page,
        transform: F,
        filters: Filters<E>,
    ) -> Result<Vec<R>, RepoError>
    where
        F: FnMut(E::Model) -> R,
    {
        let select = page.apply(order_by_pk(scoped_select(ctx, filters)?));
        let rows = select.all(&self.conn).await?;
        debug!(rows = rows.len(), "fetched scoped rows");
        Ok(rows.into_iter().map(transform).collect())
    }

    /// A page of rows together with the count of the whole filtered set.
    ///
    /// # Errors
    /// See [`get_all`](Self::get_all).
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn get_all_with_count<R, F>(
        &self,
        ctx: &TenantContext,
        page: Page,
        transform: F,
        filters: Filters<E>,
    ) -> Result<Counted<R>, RepoError>
    where
        F: FnMut(E::Model) -> R,
    {
        let base = scoped_select(ctx, filters)?;
        let count = base.clone().count(&self.conn).await?;
        let rows = page.apply(order_by_pk(base)).all(&self.conn).await?;
        Ok(Counted {
            data: rows.into_iter().map(transform).collect(),
            count,
        })
    }

    /// The first visible row (by primary key) matching `filters`.
    ///
    /// `not_found` describes the missing thing and is only called on a miss.
    ///
    /// # Errors
    /// `NotFound` when no row is visible, otherwise as [`get_all`](Self::get_all).
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn get_one<R, F, N>(
        &self,
        ctx: &TenantContext,
        transform: F,
        not_found: N,
        filters: Filters<E>,
    ) -> Result<R, RepoError>
    where
        F: FnOnce(E::Model) -> R,
        N: FnOnce() -> String,
    {
        let row = order_by_pk(scoped_select(ctx, filters)?)
            .one(&self.conn)
            .await?;
        match row {
            Some(model) => Ok(transform(model)),
            None => {
                debug!("scoped lookup found nothing");
                Err(RepoError::NotFound(not_found()))
            }
        }
    }

    /// Number of visible rows matching `filters`.
    ///
    /// # Errors
    /// See [`get_all`](Self::get_all).
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn count(&self, ctx: &TenantContext, filters: Filters<E>) -> Result<u64, RepoError> {
        count_in(&self.conn, scoped_select(ctx, filters)?).await
    }

    /// Whether any visible row matches `filters`.
    ///
    /// # Errors
    /// See [`get_all`](Self::get_all).
    pub async fn exists(&self, ctx: &TenantContext, filters: Filters<E>) -> Result<bool, RepoError> {
        Ok(self.count(ctx, filters).await? > 0)
    }

    /// Persist a new row owned by the current tenant.
    ///
    /// The tenant column is always overwritten with the context's tenant, and
    /// both timestamps are set to now. A scoped entity without a tenant column
    /// is refused, since its rows could never be read back. If `condition` rejects the candidate
    /// nothing is written and its rejection error is returned.
    ///
    /// # Errors
    /// `MissingTenant` (before any storage access), the condition's rejection
    /// (usually `AlreadyExists`), or `Persistence`.
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn insert(
        &self,
        ctx: &TenantContext,
        mut active: E::ActiveModel,
        condition: Option<InsertCondition<E>>,
    ) -> Result<E::Model, RepoError>
    where
        E: TimestampedEntity,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let owner = if E::IS_UNSCOPED {
            None
        } else {
            Some(ctx.resolve()?.clone())
        };

        let txn = self.conn.begin().await?;

        if let Some(InsertCondition { check, reject }) = condition {
            let conflict = match check {
                ConflictCheck::Existing(filters) => {
                    count_in(&txn, scoped_select(ctx, filters)?).await? > 0
                }
                ConflictCheck::Predicate(predicate) => predicate(&active),
            };
            if conflict {
                debug!("insert rejected by condition");
                return Err(reject());
            }
        }

        if let Some(tenant) = owner {
            stamp_tenant::<E>(&mut active, &tenant)?;
        }
        let now = Utc::now();
        active.try_set(E::created_at_col(), Value::from(now))?;
        active.try_set(E::updated_at_col(), Value::from(now))?;

        let model = active.insert(&txn).await?;
        txn.commit().await?;
        info!("row inserted");
        Ok(model)
    }

    /// Change the single visible row matching `filters`.
    ///
    /// `mutator` edits an active model loaded from that row; an error from it
    /// aborts the update and nothing is written. Afterwards the
    /// primary key, tenant and `created_at` columns are put back to their
    /// stored values whatever the mutator did, and `updated_at` is set to
    /// `max(now, previous updated_at)`.
    ///
    /// # Errors
    /// `MissingTenant`, `NotFound` (also when the row belongs to another
    /// tenant), the mutator's error, or `Persistence`.
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn update<M, N>(
        &self,
        ctx: &TenantContext,
        mutator: M,
        not_found: N,
        filters: Filters<E>,
    ) -> Result<E::Model, RepoError>
    where
        E: TimestampedEntity,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
        M: FnOnce(&mut E::ActiveModel) -> Result<(), RepoError>,
        N: FnOnce() -> String,
    {
        let select = order_by_pk(scoped_select(ctx, filters)?);

        let txn = self.conn.begin().await?;
        let Some(current) = select.one(&txn).await? else {
            debug!("scoped lookup found nothing to update");
            return Err(RepoError::NotFound(not_found()));
        };

        let mut active: E::ActiveModel = current.clone().into_active_model();
        mutator(&mut active)?;
        pin_immutable_columns::<E>(&mut active, &current)?;

        let previous = <DateTime<Utc> as ValueType>::try_from(current.get(E::updated_at_col())).ok();
        let now = Utc::now();
        let stamped = previous.map_or(now, |prev| prev.max(now));
        active.try_set(E::updated_at_col(), Value::from(stamped))?;

        let model = active.update(&txn).await?;
        txn.commit().await?;
        info!("row updated");
        Ok(model)
    }

    /// Remove the visible row whose id column equals `id`.
    ///
    /// Returns whether a row was removed. A row owned by another tenant is
    /// invisible, so deleting it returns `false` and leaves it intact.
    ///
    /// # Errors
    /// `MissingTenant` or `Persistence`.
    #[instrument(skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn delete<V>(&self, ctx: &TenantContext, id: V) -> Result<bool, RepoError>
    where
        E: IdentifiedEntity,
        V: Into<Value>,
    {
        let id: Value = id.into();
        let cond = FilterCompiler::compile::<E>(
            ctx,
            Filters::new().and(Expr::col(E::id_col()).eq(id)),
        )?;

        let txn = self.conn.begin().await?;
        let result = E::delete_many().filter(cond).exec(&txn).await?;
        txn.commit().await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(rows = result.rows_affected, "row deleted");
        } else {
            debug!("nothing visible to delete");
        }
        Ok(deleted)
    }
}

fn scoped_select<E>(ctx: &TenantContext, filters: Filters<E>) -> Result<Select<E>, RepoError>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
{
    let cond = FilterCompiler::compile::<E>(ctx, filters)?;
    let select = E::find();
    Ok(if cond.is_empty() {
        select
    } else {
        select.filter(cond)
    })
}

fn order_by_pk<E: EntityTrait>(select: Select<E>) -> Select<E> {
    E::PrimaryKey::iter().fold(select, |select, pk| select.order_by_asc(pk.into_column()))
}

async fn count_in<E, C>(conn: &C, select: Select<E>) -> Result<u64, RepoError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    Ok(select.count(conn).await?)
}

fn stamp_tenant<E>(active: &mut E::ActiveModel, tenant: &TenantId) -> Result<(), RepoError>
where
    E: ScopableEntity,
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    let Some(col) = E::tenant_col() else {
        return Err(RepoError::Persistence {
            message: format!(
                "{} is tenant-scoped but declares no tenant column",
                entity_name::<E>()
            ),
        });
    };
    let stamped = Value::from(tenant.as_str().to_owned());
    if let Some(supplied) = active.get(col).into_value()
        && supplied != stamped
    {
        warn!(tenant = %tenant, "discarding caller-supplied tenant id on insert");
    }
    active.try_set(col, stamped)?;
    Ok(())
}

/// Restore primary key, tenant and `created_at` to their stored values.
fn pin_immutable_columns<E>(active: &mut E::ActiveModel, current: &E::Model) -> Result<(), RepoError>
where
    E: ScopableEntity + TimestampedEntity,
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    let pinned = E::PrimaryKey::iter()
        .map(PrimaryKeyToColumn::into_column)
        .chain(E::tenant_col())
        .chain(std::iter::once(E::created_at_col()));

    for col in pinned {
        let stored = current.get(col);
        if active.get(col).into_value().as_ref() != Some(&stored) {
            debug!(column = %col.as_str(), "ignoring change to immutable column");
            active.try_set(col, stored)?;
        }
    }
    Ok(())
}
