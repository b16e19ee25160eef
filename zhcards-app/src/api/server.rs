use axum::{routing::{get, post}, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tokio::net::TcpListener;

use crate::api::routes::{create_card_set, get_card_set, list_card_sets, translate, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/card-set", get(list_card_sets).post(create_card_set))
        .route("/api/card-set/:id", get(get_card_set))
        .route("/api/translate", post(translate))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    if state.translator.is_none() {
        tracing::warn!("no translator key configured, /api/translate will answer 500");
    }
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "api listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
