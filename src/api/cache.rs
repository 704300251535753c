use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::app::AppState;

pub(crate) async fn clear(State(state): State<AppState>) -> StatusCode {
    state.cache().clear().await;
    state.telemetry().record_cache_invalidation(None);
    StatusCode::NO_CONTENT
}

pub(crate) async fn invalidate(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> StatusCode {
    let handle = state
        .config()
        .source_by_handle(&handle)
        .map_or(handle, |source| source.handle.clone());
    state.cache().invalidate(&handle).await;
    state.telemetry().record_cache_invalidation(Some(&handle));
    StatusCode::NO_CONTENT
}
