use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use zhcards_core::SharedSnapshot;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSetsOut {
    pub card_sets: Vec<SharedSnapshot>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSetIn {
    #[serde(default)]
    pub card_set: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct TaskOut {
    pub task: SharedSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCardSetOut {
    pub share_card_set: SharedSnapshot,
}

#[derive(Deserialize)]
pub struct TranslateIn {
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct TranslateOut {
    pub translation: String,
}

/// Error response rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub fn db_unavailable() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Database not available")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "Invalid JSON body")
    }
}
