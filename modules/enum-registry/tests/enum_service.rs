#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use enum_registry::{EnumDto, EnumError, EnumInput, EnumService, enum_error_to_problem};
use http::{HeaderMap, HeaderValue, StatusCode};
use sea_orm::ConnectionTrait;
use tenancy_cache::LocalCache;
use tenancy_db::{ConnectOpts, DbHandle, RepoError};
use tenancy_security::{TenantContext, TenantId};

mod currency {
    use enum_registry::{EnumDto, EnumEntity};
    use sea_orm::entity::prelude::*;
    use tenancy_db::scoped::Scopable;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "currencies")]
    #[tenancy(tenant_col = "tenant_id", id_col = "id", timestamps)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub tenant_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl EnumEntity for Entity {
        fn name_col() -> Column {
            Column::Name
        }

        fn to_dto(model: &Model) -> EnumDto {
            EnumDto {
                id: model.id.clone(),
                name: model.name.clone(),
            }
        }
    }
}

const DDL: &str = "CREATE TABLE currencies (
    tenant_id TEXT NOT NULL,
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (tenant_id, id)
)";

struct Fixture {
    db: DbHandle,
    cache: Arc<LocalCache>,
    service: EnumService<currency::Entity>,
}

async fn fixture_with(cache: LocalCache) -> Fixture {
    let db = DbHandle::connect(
        "sqlite::memory:",
        ConnectOpts {
            max_conns: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    db.conn().execute_unprepared(DDL).await.unwrap();
    let cache = Arc::new(cache);
    let service = EnumService::new(db.repository::<currency::Entity>(), Arc::clone(&cache));
    Fixture { db, cache, service }
}

async fn fixture() -> Fixture {
    fixture_with(LocalCache::new()).await
}

fn ctx(tenant: &str) -> TenantContext {
    TenantContext::for_tenant(TenantId::parse(tenant).unwrap())
}

fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).unwrap()
}

fn cached(f: &Fixture, t: &str) -> Option<Vec<EnumDto>> {
    f.cache.get(&tenant(t), "currencies").unwrap()
}

#[tokio::test]
async fn create_derives_id_and_populates_cache() {
    let f = fixture().await;

    let dto = f
        .service
        .create(&ctx("acme"), &EnumInput::new("US Dollar"))
        .await
        .unwrap();
    assert_eq!(dto.id, "us_dollar");
    assert_eq!(dto.name, "US Dollar");

    assert_eq!(cached(&f, "acme"), Some(vec![dto.clone()]));
    assert_eq!(f.service.get(&ctx("acme"), "us_dollar").await.unwrap(), dto);
    assert_eq!(f.service.count(&ctx("acme")).await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_name_conflicts_within_tenant_only() {
    let f = fixture().await;
    f.service
        .create(&ctx("acme"), &EnumInput::new("Euro"))
        .await
        .unwrap();

    let err = f
        .service
        .create(&ctx("acme"), &EnumInput::new("euro"))
        .await
        .unwrap_err();
    assert!(matches!(err, EnumError::Repo(RepoError::AlreadyExists(ref id)) if id == "euro"));
    assert_eq!(
        enum_error_to_problem(&err, "/currencies").status,
        StatusCode::CONFLICT
    );

    f.service
        .create(&ctx("globex"), &EnumInput::new("Euro"))
        .await
        .unwrap();
    assert_eq!(f.service.list(&ctx("globex")).await.unwrap().len(), 1);
    assert_eq!(f.service.list(&ctx("acme")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_is_served_from_cache_once_loaded() {
    let f = fixture().await;
    f.service
        .create(&ctx("acme"), &EnumInput::new("Euro"))
        .await
        .unwrap();

    // A row written behind the service's back is invisible while the list is cached.
    f.db.conn()
        .execute_unprepared(
            "INSERT INTO currencies (tenant_id, id, name, created_at, updated_at) \
             VALUES ('acme', 'yen', 'Yen', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
        )
        .await
        .unwrap();
    assert_eq!(f.service.list(&ctx("acme")).await.unwrap().len(), 1);

    f.cache.clear_tenant(&tenant("acme"));
    let ids: Vec<String> = f
        .service
        .list(&ctx("acme"))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["euro", "yen"]);
}

#[tokio::test]
async fn update_renames_and_refreshes_cache() {
    let f = fixture().await;
    f.service
        .create(&ctx("acme"), &EnumInput::new("Euro"))
        .await
        .unwrap();

    let renamed = f
        .service
        .update(&ctx("acme"), "euro", &EnumInput::new("Euro Coin"))
        .await
        .unwrap();
    assert_eq!(renamed.id, "euro");
    assert_eq!(renamed.name, "Euro Coin");
    assert_eq!(cached(&f, "acme").unwrap()[0].name, "Euro Coin");

    let err = f
        .service
        .update(&ctx("globex"), "euro", &EnumInput::new("Stolen"))
        .await
        .unwrap_err();
    let problem = enum_error_to_problem(&err, "/currencies/euro");
    assert_eq!(problem.status, StatusCode::NOT_FOUND);
    assert_eq!(problem.detail, "euro does not exist in the database");
    assert_eq!(
        f.service.get(&ctx("acme"), "euro").await.unwrap().name,
        "Euro Coin"
    );
}

#[tokio::test]
async fn delete_removes_from_database_and_cache() {
    let f = fixture().await;
    f.service
        .create(&ctx("acme"), &EnumInput::new("Euro"))
        .await
        .unwrap();
    f.service
        .create(&ctx("acme"), &EnumInput::new("Pound"))
        .await
        .unwrap();

    assert!(!f.service.delete(&ctx("globex"), "euro").await.unwrap());
    assert!(f.service.delete(&ctx("acme"), "euro").await.unwrap());

    let remaining = cached(&f, "acme").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "pound");
    assert_eq!(f.service.count(&ctx("acme")).await.unwrap(), 1);

    let err = f.service.get(&ctx("acme"), "euro").await.unwrap_err();
    assert_eq!(
        enum_error_to_problem(&err, "/currencies/euro").status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn invalid_names_are_rejected_before_storage() {
    let f = fixture().await;

    let err = f
        .service
        .create(&ctx("acme"), &EnumInput::new("US$"))
        .await
        .unwrap_err();
    let problem = enum_error_to_problem(&err, "/currencies");
    assert_eq!(problem.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(problem.errors.unwrap()[0].field, "name");
    assert_eq!(f.service.count(&ctx("acme")).await.unwrap(), 0);
}

#[tokio::test]
async fn request_without_tenant_header_is_a_bad_request() {
    let f = fixture().await;
    let ctx = TenantContext::from_headers(&HeaderMap::new(), "TenantId");

    let err = f.service.list(&ctx).await.unwrap_err();
    let problem = enum_error_to_problem(&err, "/currencies");
    assert_eq!(problem.status, StatusCode::BAD_REQUEST);
    assert!(problem.detail.contains("TenantId"));
}

#[tokio::test]
async fn tenant_from_headers_scopes_the_registry() {
    let f = fixture().await;
    let mut headers = HeaderMap::new();
    headers.insert("tenantid", HeaderValue::from_static("acme"));
    let acme = TenantContext::from_headers(&headers, "TenantId");

    f.service
        .create(&acme, &EnumInput::new("Euro"))
        .await
        .unwrap();
    assert!(f.service.list(&ctx("globex")).await.unwrap().is_empty());
    assert_eq!(f.service.list(&ctx("acme")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn disabled_cache_always_reads_through() {
    let f = fixture_with(LocalCache::disabled()).await;
    f.service
        .create(&ctx("acme"), &EnumInput::new("Euro"))
        .await
        .unwrap();
    assert_eq!(cached(&f, "acme"), None);

    f.db.conn()
        .execute_unprepared("DELETE FROM currencies")
        .await
        .unwrap();
    assert!(f.service.list(&ctx("acme")).await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupted_cache_entry_is_an_internal_error() {
    let f = fixture().await;
    f.cache.set(&tenant("acme"), "currencies", "not a list").unwrap();

    let err = f.service.list(&ctx("acme")).await.unwrap_err();
    assert!(matches!(err, EnumError::Cache(_)));
    let problem = enum_error_to_problem(&err, "/currencies");
    assert_eq!(problem.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!problem.detail.contains("not a list"));
}
