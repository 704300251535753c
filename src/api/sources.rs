use axum::{Json, extract::State};

use crate::{app::AppState, domain::NewsSource};

pub(crate) async fn list(State(state): State<AppState>) -> Json<Vec<NewsSource>> {
    Json(state.config().news_sources().to_vec())
}
