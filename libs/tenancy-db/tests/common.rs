#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use sea_orm::{ActiveValue::Set, ConnectionTrait};
use tenancy_db::{ConnectOpts, DbHandle};
use tenancy_security::{TenantContext, TenantId};

pub mod note {
    use sea_orm::entity::prelude::*;
    use tenancy_db::scoped::Scopable;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "notes")]
    #[tenancy(tenant_col = "tenant_id", id_col = "id", timestamps)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub tenant_id: String,
        pub title: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod country {
    use sea_orm::entity::prelude::*;
    use tenancy_db::scoped::Scopable;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "countries")]
    #[tenancy(unscoped, id_col = "code", timestamps)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub code: String,
        pub name: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Scoped entity whose tenant column was never declared.
pub mod draft {
    use sea_orm::entity::prelude::*;
    use tenancy_db::scoped::{IdentifiedEntity, ScopableEntity, TimestampedEntity};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "drafts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub tenant_id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl ScopableEntity for Entity {
        fn tenant_col() -> Option<Column> {
            None
        }
    }

    impl IdentifiedEntity for Entity {
        fn id_col() -> Column {
            Column::Id
        }
    }

    impl TimestampedEntity for Entity {
        fn created_at_col() -> Column {
            Column::CreatedAt
        }

        fn updated_at_col() -> Column {
            Column::UpdatedAt
        }
    }
}

/// Timestamps declared with an offset instead of `DateTimeUtc`.
pub mod event {
    use sea_orm::entity::prelude::*;
    use tenancy_db::scoped::Scopable;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "events")]
    #[tenancy(tenant_col = "tenant_id", id_col = "id", timestamps)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub tenant_id: String,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub const DRAFTS_DDL: &str = "CREATE TABLE drafts (
    id TEXT PRIMARY KEY NOT NULL,
    tenant_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub const EVENTS_DDL: &str = "CREATE TABLE events (
    id TEXT PRIMARY KEY NOT NULL,
    tenant_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub const NOTES_DDL: &str = "CREATE TABLE notes (
    id TEXT PRIMARY KEY NOT NULL,
    tenant_id TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub const COUNTRIES_DDL: &str = "CREATE TABLE countries (
    code TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// In-memory database. A single connection so every query sees the same memory DB.
pub async fn empty_db() -> DbHandle {
    let opts = ConnectOpts {
        max_conns: Some(1),
        ..Default::default()
    };
    DbHandle::connect("sqlite::memory:", opts)
        .await
        .expect("connect to in-memory sqlite")
}

pub async fn setup() -> DbHandle {
    let db = empty_db().await;
    db.conn().execute_unprepared(NOTES_DDL).await.unwrap();
    db.conn().execute_unprepared(COUNTRIES_DDL).await.unwrap();
    db
}

pub fn ctx(tenant: &str) -> TenantContext {
    TenantContext::for_tenant(TenantId::parse(tenant).unwrap())
}

pub fn new_note(id: &str, title: &str) -> note::ActiveModel {
    note::ActiveModel {
        id: Set(id.to_owned()),
        title: Set(title.to_owned()),
        ..Default::default()
    }
}

pub async fn seed_note(db: &DbHandle, tenant: &str, id: &str, title: &str) -> note::Model {
    db.repository::<note::Entity>()
        .insert(&ctx(tenant), new_note(id, title), None)
        .await
        .unwrap()
}
