use serde_json::Value;

use crate::{
    expenses::{
        dto::{CreateExpenseRequest, UpdateExpenseRequest},
        repo::ExpenseKind,
    },
    users::repo::Users,
    validation::FieldErrors,
};

/// Synchronous field rules for expense creation.
pub fn validate_fields(req: &CreateExpenseRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match req.amount.as_ref() {
        Some(value) if value.is_number() => {}
        _ => errors.push("amount", "amount must be a number"),
    }

    match req.kind.as_ref() {
        None => errors.push("type", "is required"),
        Some(Value::String(s)) if ExpenseKind::parse(s).is_some() => {}
        Some(_) => errors.push("type", "type must be one of [expense, income]"),
    }

    errors
}

/// Field rules for expense update: every field is optional, but a present
/// `amount` or `type` is held to the same rules as on create.
pub fn validate_update_fields(req: &UpdateExpenseRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(value) = req.amount.as_ref() {
        if !value.is_number() {
            errors.push("amount", "amount must be a number");
        }
    }

    match req.kind.as_ref() {
        None => {}
        Some(Value::String(s)) if ExpenseKind::parse(s).is_some() => {}
        Some(_) => errors.push("type", "type must be one of [expense, income]"),
    }

    errors
}

/// Full create validation: field rules plus the asynchronous cross-reference
/// check that the owning user actually exists. The principal is already
/// trusted at this point; the lookup is deliberately defensive.
pub async fn validate_create(
    users: &Users,
    req: &CreateExpenseRequest,
    user_id: i64,
) -> anyhow::Result<FieldErrors> {
    let mut errors = validate_fields(req);
    if !users.exists(user_id).await? {
        errors.push("user", "user is not valid");
    }
    Ok(errors)
}
