use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    error::AppError,
    response::Paging,
    validation::FieldErrors,
};

/// Persistence capability implemented once per entity. The `Patch` type is the
/// explicit allow-list of mutable fields; anything outside it cannot reach the
/// stored record through `update_one`.
#[async_trait]
pub trait CrudStore: Send + Sync {
    type Draft: Send;
    type Entity: Send;
    type Id: Sync;
    type Filter: Sync;
    type Patch: Send;

    async fn save(&self, draft: Self::Draft) -> anyhow::Result<Self::Entity>;
    async fn find_one(&self, id: &Self::Id) -> anyhow::Result<Option<Self::Entity>>;
    /// Returns one page of matches plus the total match count.
    async fn find_page(
        &self,
        filter: &Self::Filter,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<(Vec<Self::Entity>, i64)>;
    async fn update_one(
        &self,
        entity: Self::Entity,
        patch: Self::Patch,
    ) -> anyhow::Result<Self::Entity>;
    async fn delete_one(&self, entity: &Self::Entity) -> anyhow::Result<()>;
}

/// Offset/limit paging parsed leniently from the query string: missing or
/// non-numeric (or non-positive) values fall back to page 1, 10 per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: i64,
    pub item_per_page: i64,
}

impl PageQuery {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_ITEM_PER_PAGE: i64 = 10;

    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let parse = |key: &str, default: i64| {
            query
                .get(key)
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        Self {
            page: parse("page", Self::DEFAULT_PAGE),
            item_per_page: parse("itemPerPage", Self::DEFAULT_ITEM_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.item_per_page
    }

    pub fn paging(&self, item_count: i64) -> Paging {
        Paging {
            page: self.page,
            item_per_page: self.item_per_page,
            item_count,
            last_page: (item_count + self.item_per_page - 1) / self.item_per_page,
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            item_per_page: Self::DEFAULT_ITEM_PER_PAGE,
        }
    }
}

pub async fn create<S: CrudStore>(store: &S, draft: S::Draft) -> Result<S::Entity, AppError> {
    Ok(store.save(draft).await?)
}

/// Runs the collected validation first; a populated error map wins over
/// persistence and is reported as the distinct 400 shape.
pub async fn create_validated<S: CrudStore>(
    store: &S,
    errors: FieldErrors,
    draft: S::Draft,
) -> Result<S::Entity, AppError> {
    errors.into_result()?;
    create(store, draft).await
}

/// Pass-through single lookup: a miss is `Ok(None)`, not an error. The real
/// not-found policy lives with the ownership gate.
pub async fn get_single<S: CrudStore>(
    store: &S,
    id: &S::Id,
) -> Result<Option<S::Entity>, AppError> {
    Ok(store.find_one(id).await?)
}

pub async fn get_page<S: CrudStore>(
    store: &S,
    filter: &S::Filter,
    page: PageQuery,
) -> Result<(Vec<S::Entity>, Paging), AppError> {
    let (rows, item_count) = store
        .find_page(filter, page.offset(), page.item_per_page)
        .await?;
    Ok((rows, page.paging(item_count)))
}

pub async fn update<S: CrudStore>(
    store: &S,
    id: &S::Id,
    patch: S::Patch,
) -> Result<S::Entity, AppError> {
    let entity = store.find_one(id).await?.ok_or(AppError::NotFound)?;
    Ok(store.update_one(entity, patch).await?)
}

/// Removes the record and answers with its last known values.
pub async fn delete<S: CrudStore>(store: &S, id: &S::Id) -> Result<S::Entity, AppError> {
    let entity = store.find_one(id).await?.ok_or(AppError::NotFound)?;
    store.delete_one(&entity).await?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: i64,
        owner: i64,
        body: String,
    }

    struct NoteDraft {
        owner: i64,
        body: String,
    }

    #[derive(Default)]
    struct NotePatch {
        body: Option<String>,
    }

    /// In-memory stand-in for the Postgres-backed stores.
    #[derive(Default)]
    struct MemNotes {
        rows: Mutex<Vec<Note>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl CrudStore for MemNotes {
        type Draft = NoteDraft;
        type Entity = Note;
        type Id = i64;
        type Filter = i64; // owner
        type Patch = NotePatch;

        async fn save(&self, draft: NoteDraft) -> anyhow::Result<Note> {
            // The body column is unique, standing in for a store-level
            // constraint like users.email.
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|n| n.body == draft.body) {
                anyhow::bail!("duplicate key value violates unique constraint \"notes_body_key\"");
            }
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let note = Note {
                id: *next,
                owner: draft.owner,
                body: draft.body,
            };
            rows.push(note.clone());
            Ok(note)
        }

        async fn find_one(&self, id: &i64) -> anyhow::Result<Option<Note>> {
            Ok(self.rows.lock().unwrap().iter().find(|n| n.id == *id).cloned())
        }

        async fn find_page(
            &self,
            owner: &i64,
            offset: i64,
            limit: i64,
        ) -> anyhow::Result<(Vec<Note>, i64)> {
            let rows = self.rows.lock().unwrap();
            let matches: Vec<Note> = rows.iter().filter(|n| n.owner == *owner).cloned().collect();
            let total = matches.len() as i64;
            let page = matches
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect();
            Ok((page, total))
        }

        async fn update_one(&self, entity: Note, patch: NotePatch) -> anyhow::Result<Note> {
            let mut rows = self.rows.lock().unwrap();
            let stored = rows
                .iter_mut()
                .find(|n| n.id == entity.id)
                .expect("updated entity was just looked up");
            if let Some(body) = patch.body {
                stored.body = body;
            }
            Ok(stored.clone())
        }

        async fn delete_one(&self, entity: &Note) -> anyhow::Result<()> {
            self.rows.lock().unwrap().retain(|n| n.id != entity.id);
            Ok(())
        }
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn page_query_defaults_on_missing_or_garbage() {
        assert_eq!(PageQuery::from_query(&query(&[])), PageQuery::default());
        assert_eq!(
            PageQuery::from_query(&query(&[("page", "abc"), ("itemPerPage", "-3")])),
            PageQuery::default()
        );
        assert_eq!(
            PageQuery::from_query(&query(&[("page", "3"), ("itemPerPage", "25")])),
            PageQuery {
                page: 3,
                item_per_page: 25
            }
        );
    }

    #[test]
    fn paging_math_rounds_last_page_up() {
        let page = PageQuery::default();
        assert_eq!(page.paging(0).last_page, 0);
        assert_eq!(page.paging(10).last_page, 1);
        assert_eq!(page.paging(11).last_page, 2);
        assert_eq!(PageQuery { page: 2, item_per_page: 10 }.offset(), 10);
    }

    #[tokio::test]
    async fn create_then_get_single() {
        let store = MemNotes::default();
        let note = create(
            &store,
            NoteDraft {
                owner: 1,
                body: "coffee".into(),
            },
        )
        .await
        .unwrap();
        let found = get_single(&store, &note.id).await.unwrap();
        assert_eq!(found, Some(note));
    }

    #[tokio::test]
    async fn get_single_miss_is_ok_none() {
        let store = MemNotes::default();
        assert_eq!(get_single(&store, &42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_validated_rejects_before_persisting() {
        let store = MemNotes::default();
        let mut errors = FieldErrors::new();
        errors.push("body", "is required");
        let result = create_validated(
            &store,
            errors,
            NoteDraft {
                owner: 1,
                body: String::new(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_unique_value_is_internal_error_not_validation() {
        use axum::{http::StatusCode, response::IntoResponse};

        let store = MemNotes::default();
        create(&store, NoteDraft { owner: 1, body: "a@a.com".into() })
            .await
            .unwrap();

        // The losing racer of a unique-constraint conflict surfaces as 500;
        // there is no pre-check turning it into a clean validation error.
        let second = create(&store, NoteDraft { owner: 2, body: "a@a.com".into() })
            .await
            .err()
            .expect("second save with the same unique value must fail");
        assert!(matches!(second, AppError::Internal(_)));
        assert_eq!(
            second.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_page_scopes_and_counts() {
        let store = MemNotes::default();
        for i in 0..5 {
            create(&store, NoteDraft { owner: 1, body: format!("a{i}") })
                .await
                .unwrap();
            create(&store, NoteDraft { owner: 2, body: format!("b{i}") })
                .await
                .unwrap();
        }
        let page = PageQuery { page: 1, item_per_page: 3 };
        let (rows, paging) = get_page(&store, &1, page).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|n| n.owner == 1));
        assert_eq!(paging.item_count, 5);
        assert_eq!(paging.last_page, 2);
    }

    #[tokio::test]
    async fn update_applies_allow_list_and_404s_on_miss() {
        let store = MemNotes::default();
        let note = create(&store, NoteDraft { owner: 1, body: "old".into() })
            .await
            .unwrap();

        let updated = update(&store, &note.id, NotePatch { body: Some("new".into()) })
            .await
            .unwrap();
        assert_eq!(updated.body, "new");
        assert_eq!(updated.owner, 1);

        let missing = update(&store, &99, NotePatch::default()).await;
        assert!(matches!(missing, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_returns_last_known_values() {
        let store = MemNotes::default();
        let note = create(&store, NoteDraft { owner: 1, body: "gone".into() })
            .await
            .unwrap();
        let removed = delete(&store, &note.id).await.unwrap();
        assert_eq!(removed, note);
        assert!(store.rows.lock().unwrap().is_empty());

        let again = delete(&store, &note.id).await;
        assert!(matches!(again, Err(AppError::NotFound)));
    }
}
