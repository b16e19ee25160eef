use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use zhcards_core::SnapshotStore;

use crate::api::dto::{
    ApiError, CardSetIn, CardSetsOut, ShareCardSetOut, TaskOut, TranslateIn, TranslateOut,
};
use crate::api::translate::Translator;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<dyn SnapshotStore>,
    pub translator: Option<Arc<dyn Translator>>,
}

pub async fn list_card_sets(State(st): State<Arc<AppState>>) -> Result<Json<CardSetsOut>, ApiError> {
    let card_sets = st.snapshots.list().await.map_err(|e| {
        warn!(error = %e, "listing snapshots failed");
        ApiError::db_unavailable()
    })?;
    Ok(Json(CardSetsOut { card_sets }))
}

pub async fn create_card_set(
    State(st): State<Arc<AppState>>,
    body: Result<Json<CardSetIn>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskOut>), ApiError> {
    let Json(body) = body?;
    let task = st.snapshots.insert(body.card_set).await.map_err(|e| {
        warn!(error = %e, "storing snapshot failed");
        ApiError::db_unavailable()
    })?;
    Ok((StatusCode::CREATED, Json(TaskOut { task })))
}

pub async fn get_card_set(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShareCardSetOut>, ApiError> {
    let snap = st.snapshots.get(&id).await.map_err(|e| {
        warn!(error = %e, "reading snapshot failed");
        ApiError::db_unavailable()
    })?;
    let share_card_set = snap.ok_or(ApiError::new(StatusCode::NOT_FOUND, "Not found"))?;
    Ok(Json(ShareCardSetOut { share_card_set }))
}

// Body errors are reported only once a translator is configured.
pub async fn translate(
    State(st): State<Arc<AppState>>,
    body: Result<Json<TranslateIn>, JsonRejection>,
) -> Response {
    let Some(translator) = st.translator.clone() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "translation": "" })),
        )
            .into_response();
    };

    let text = body.ok().and_then(|Json(b)| b.text);
    let text = match text.as_ref().and_then(|v| v.as_str()).map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return ApiError::new(StatusCode::BAD_REQUEST, "Missing text").into_response(),
    };

    match translator.translate(&text).await {
        Ok(translation) => Json(TranslateOut { translation }).into_response(),
        Err(e) => {
            warn!(error = %e, "translation failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Translation failed").into_response()
        }
    }
}
