use serde::Deserialize;
use serde_json::Value;

use crate::expenses::repo::ExpenseKind;

/// Create body. `amount` and `type` stay untyped here so a wrong JSON type
/// becomes a field-level validation message instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: Option<Value>,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
}

impl CreateExpenseRequest {
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_ref().and_then(Value::as_f64)
    }

    pub fn kind_value(&self) -> Option<ExpenseKind> {
        self.kind.as_ref().and_then(Value::as_str).and_then(ExpenseKind::parse)
    }
}

/// Update body. There is no owner field, so a caller-supplied `userId` is
/// dropped on deserialization and can never reach the patch. `amount` and
/// `type` stay untyped for the same reason they do on create: wrong JSON
/// types become field-level validation messages, not body rejections.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<Value>,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
}

impl UpdateExpenseRequest {
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_ref().and_then(Value::as_f64)
    }

    pub fn kind_value(&self) -> Option<ExpenseKind> {
        self.kind.as_ref().and_then(Value::as_str).and_then(ExpenseKind::parse)
    }
}
