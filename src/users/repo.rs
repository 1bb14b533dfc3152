use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::crud::CrudStore;

/// User record. Only id, name and email ever reach a response body; the digest
/// and lifecycle timestamps stay server-side.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Allow-list of user fields mutable through self-update. Email is absent on
/// purpose: it is immutable after registration.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

const COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct Users {
    db: PgPool,
}

impl Users {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        self.find_one(&id).await
    }

    /// Defensive existence check used by the expense create validator.
    pub async fn exists(&self, id: i64) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }
}

// The full store contract is implemented even though no route lists or
// removes users today; removal stays soft so user rows are never dropped.
#[async_trait]
impl CrudStore for Users {
    type Draft = NewUser;
    type Entity = User;
    type Id = i64;
    type Filter = ();
    type Patch = UserPatch;

    // No uniqueness pre-check here: concurrent duplicate registrations are
    // arbitrated by the unique index, and the loser surfaces as 500.
    async fn save(&self, draft: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_one(&self, id: &i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_page(
        &self,
        _filter: &(),
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<(Vec<User>, i64)> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                .fetch_one(&self.db)
                .await?;
        Ok((rows, count))
    }

    async fn update_one(&self, entity: User, patch: UserPatch) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 password_hash = COALESCE($3, password_hash),
                 updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(entity.id)
        .bind(patch.name)
        .bind(patch.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    // Users are never hard-deleted; removal just stamps deleted_at.
    async fn delete_one(&self, entity: &User) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET deleted_at = now() WHERE id = $1")
            .bind(entity.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
