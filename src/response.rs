use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    #[serde(rename = "itemPerPage")]
    pub item_per_page: i64,
    #[serde(rename = "itemCount")]
    pub item_count: i64,
    #[serde(rename = "lastPage")]
    pub last_page: i64,
}

/// Uniform success envelope: `{status, message, data?, paging?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub message: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            status: "ok",
            message,
            data,
            paging: None,
        }
    }

    pub fn paged(message: &'static str, data: T, paging: Paging) -> Self {
        Self {
            status: "ok",
            message,
            data,
            paging: Some(paging),
        }
    }
}

pub fn ok<T: Serialize>(message: &'static str, data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::ok(message, data)))
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, Json(Envelope::ok("created", data)))
}
