use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityName, IntoActiveModel, Value};
use tenancy_cache::LocalCache;
use tenancy_db::scoped::{Filters, InsertCondition, RepoError, TenantRepository};
use tenancy_security::{TenantContext, TenantId};
use tracing::{debug, info, instrument};

use crate::domain::error::EnumError;
use crate::domain::model::{EnumDto, EnumInput, enum_id_from_name};
use crate::infra::storage::entity::EnumEntity;

/// CRUD over one enumeration table with a per-tenant read-through cache.
///
/// The whole list for a tenant is cached under the table name. Writes hit the
/// database first and then patch the cached list, so a cache failure never
/// loses a write.
pub struct EnumService<E> {
    repo: TenantRepository<E>,
    cache: Arc<LocalCache>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> EnumService<E>
where
    E: EnumEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    #[must_use]
    pub fn new(repo: TenantRepository<E>, cache: Arc<LocalCache>) -> Self {
        Self {
            repo,
            cache,
            _entity: PhantomData,
        }
    }

    fn cache_key() -> String {
        E::default().table_name().to_owned()
    }

    fn id_filter(id: &str) -> Filters<E> {
        Filters::new().and(Expr::col(E::id_col()).eq(id))
    }

    /// All values of the current tenant, from cache when present.
    ///
    /// # Errors
    /// Missing tenant, storage or cache failures.
    #[instrument(skip_all, fields(table = %Self::cache_key()))]
    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<EnumDto>, EnumError> {
        let tenant = ctx.resolve()?;
        self.load(ctx, tenant).await
    }

    async fn load(&self, ctx: &TenantContext, tenant: &TenantId) -> Result<Vec<EnumDto>, EnumError> {
        let key = Self::cache_key();
        if let Some(items) = self.cache.get::<Vec<EnumDto>>(tenant, &key)? {
            debug!(count = items.len(), "served from cache");
            return Ok(items);
        }
        let items = self
            .repo
            .get_all(ctx, |m| E::to_dto(&m), Filters::new())
            .await?;
        self.cache.set(tenant, &key, &items)?;
        debug!(count = items.len(), "loaded from database");
        Ok(items)
    }

    /// One value by id, looked up in the (cached) list.
    ///
    /// # Errors
    /// `NotFound` when the tenant has no value with this id.
    #[instrument(skip_all, fields(table = %Self::cache_key(), id = %id))]
    pub async fn get(&self, ctx: &TenantContext, id: &str) -> Result<EnumDto, EnumError> {
        self.list(ctx)
            .await?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| RepoError::not_found(id).into())
    }

    /// Number of values of the current tenant, counted in the database.
    ///
    /// # Errors
    /// Missing tenant or storage failure.
    pub async fn count(&self, ctx: &TenantContext) -> Result<u64, EnumError> {
        Ok(self.repo.count(ctx, Filters::new()).await?)
    }

    /// Add a value whose id is derived from its name.
    ///
    /// # Errors
    /// `Validation`, `AlreadyExists` if the tenant already has that id,
    /// missing tenant, storage or cache failures.
    #[instrument(skip_all, fields(table = %Self::cache_key()))]
    pub async fn create(&self, ctx: &TenantContext, input: &EnumInput) -> Result<EnumDto, EnumError> {
        input.validate()?;
        let tenant = ctx.resolve()?;

        let id = enum_id_from_name(&input.name);
        let taken = id.clone();
        let condition = InsertCondition::unique_where(Self::id_filter(&id), move || {
            RepoError::already_exists(taken)
        });

        let candidate = E::new_active(id, input.name.clone()).map_err(RepoError::from)?;
        let model = self.repo.insert(ctx, candidate, Some(condition)).await?;
        let dto = E::to_dto(&model);
        info!(id = %dto.id, "enum value created");

        self.upsert_cached(ctx, tenant, &dto).await?;
        Ok(dto)
    }

    /// Rename the value `id`.
    ///
    /// # Errors
    /// `Validation`, `NotFound`, missing tenant, storage or cache failures.
    #[instrument(skip_all, fields(table = %Self::cache_key(), id = %id))]
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: &str,
        input: &EnumInput,
    ) -> Result<EnumDto, EnumError> {
        input.validate()?;
        let tenant = ctx.resolve()?;

        let name = input.name.clone();
        let model = self
            .repo
            .update(
                ctx,
                |active| active.try_set(E::name_col(), Value::from(name)).map_err(RepoError::from),
                || id.to_owned(),
                Self::id_filter(id),
            )
            .await?;
        let dto = E::to_dto(&model);
        info!("enum value renamed");

        self.upsert_cached(ctx, tenant, &dto).await?;
        Ok(dto)
    }

    /// Remove the value `id`. Returns whether anything was removed.
    ///
    /// # Errors
    /// Missing tenant, storage or cache failures.
    #[instrument(skip_all, fields(table = %Self::cache_key(), id = %id))]
    pub async fn delete(&self, ctx: &TenantContext, id: &str) -> Result<bool, EnumError> {
        let tenant = ctx.resolve()?;
        let deleted = self.repo.delete(ctx, id.to_owned()).await?;
        if deleted {
            let key = Self::cache_key();
            if let Some(mut items) = self.cache.get::<Vec<EnumDto>>(tenant, &key)? {
                items.retain(|item| item.id != id);
                self.cache.set(tenant, &key, &items)?;
            }
            info!("enum value deleted");
        }
        Ok(deleted)
    }

    async fn upsert_cached(
        &self,
        ctx: &TenantContext,
        tenant: &TenantId,
        dto: &EnumDto,
    ) -> Result<(), EnumError> {
        let mut items = self.load(ctx, tenant).await?;
        match items.iter_mut().find(|item| item.id == dto.id) {
            Some(item) => item.name.clone_from(&dto.name),
            None => items.push(dto.clone()),
        }
        self.cache.set(tenant, &Self::cache_key(), &items)?;
        Ok(())
    }
}
