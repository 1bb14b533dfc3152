use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    crud::{self, CrudStore, PageQuery},
    error::AppError,
    expenses::{
        dto::{CreateExpenseRequest, UpdateExpenseRequest},
        repo::{Expense, ExpenseKind, ExpensePatch, Expenses, NewExpense},
        validator,
    },
    response::{self, Envelope},
    state::AppState,
    users::repo::Users,
};

/// Ownership gate: a miss is 404, someone else's record is 403. Existence is
/// knowingly revealed to non-owners; content is not.
fn owned_by(found: Option<Expense>, user_id: i64) -> Result<Expense, AppError> {
    let expense = found.ok_or(AppError::NotFound)?;
    if expense.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(expense)
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn create_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = user.0;
    let users = Users::new(state.db.clone());
    let expenses = Expenses::new(state.db.clone());

    let errors = validator::validate_create(&users, &payload, principal.id).await?;
    // Draft fields fall back to defaults; a populated error map wins first.
    let amount = payload.amount_value().unwrap_or_default();
    let kind = payload.kind_value().unwrap_or(ExpenseKind::Expense);
    let draft = NewExpense {
        amount,
        note: payload.note,
        kind,
        user_id: principal.id,
    };
    let expense = crud::create_validated(&expenses, errors, draft).await?;

    info!(expense_id = %expense.id, "expense created");
    Ok(response::created(expense))
}

#[instrument(skip(state, user, query), fields(user_id = user.0.id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = Expenses::new(state.db.clone());
    let page = PageQuery::from_query(&query);
    let (rows, paging) = crud::get_page(&expenses, &user.0.id, page).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::paged("retrieved", rows, paging)),
    ))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn get_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = Expenses::new(state.db.clone());
    let expense = owned_by(crud::get_single(&expenses, &id).await?, user.0.id)?;
    Ok(response::ok("retrieved", expense))
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn update_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<impl IntoResponse, AppError> {
    validator::validate_update_fields(&payload).into_result()?;

    let expenses = Expenses::new(state.db.clone());
    let existing = owned_by(expenses.find_one(&id).await?, user.0.id)?;
    let amount = payload.amount_value();
    let kind = payload.kind_value();
    let updated = expenses
        .update_one(
            existing,
            ExpensePatch {
                amount,
                note: payload.note,
                kind,
            },
        )
        .await?;

    info!(expense_id = %updated.id, "expense updated");
    Ok(response::ok("updated", updated))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = Expenses::new(state.db.clone());
    let existing = owned_by(expenses.find_one(&id).await?, user.0.id)?;
    expenses.delete_one(&existing).await?;

    info!(expense_id = %existing.id, "expense deleted");
    Ok(response::ok("deleted", existing))
}
