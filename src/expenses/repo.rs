use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::crud::CrudStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "expense_kind", rename_all = "lowercase")]
pub enum ExpenseKind {
    Expense,
    Income,
}

impl ExpenseKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }
}

/// Expense record. The owning user is immutable after creation; the JSON shape
/// uses `type` and `userId` as field names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub kind: ExpenseKind,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewExpense {
    pub amount: f64,
    pub note: Option<String>,
    pub kind: ExpenseKind,
    pub user_id: i64,
}

/// Allow-list of mutable expense fields. Ownership is not here, so no patch
/// can move an expense between users.
#[derive(Debug, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub note: Option<String>,
    pub kind: Option<ExpenseKind>,
}

const COLUMNS: &str = "id, amount, note, kind, user_id, created_at, updated_at";

#[derive(Clone)]
pub struct Expenses {
    db: PgPool,
}

impl Expenses {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CrudStore for Expenses {
    type Draft = NewExpense;
    type Entity = Expense;
    type Id = Uuid;
    type Filter = i64; // owning user
    type Patch = ExpensePatch;

    async fn save(&self, draft: NewExpense) -> anyhow::Result<Expense> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "INSERT INTO expenses (id, amount, note, kind, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(draft.amount)
        .bind(&draft.note)
        .bind(draft.kind)
        .bind(draft.user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(expense)
    }

    async fn find_one(&self, id: &Uuid) -> anyhow::Result<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {COLUMNS} FROM expenses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(expense)
    }

    async fn find_page(
        &self,
        user_id: &i64,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<(Vec<Expense>, i64)> {
        let rows = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {COLUMNS} FROM expenses WHERE user_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM expenses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok((rows, count))
    }

    async fn update_one(&self, entity: Expense, patch: ExpensePatch) -> anyhow::Result<Expense> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "UPDATE expenses
             SET amount = COALESCE($2, amount),
                 note = COALESCE($3, note),
                 kind = COALESCE($4, kind),
                 updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(entity.id)
        .bind(patch.amount)
        .bind(patch.note)
        .bind(patch.kind)
        .fetch_one(&self.db)
        .await?;
        Ok(expense)
    }

    async fn delete_one(&self, entity: &Expense) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(entity.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
