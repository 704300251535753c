use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use super::error::ApiError;
use crate::{app::AppState, report::ObjectivityReport};

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    limit: Option<usize>,
}

pub(crate) async fn source_report(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<ObjectivityReport>, ApiError> {
    let Query(query) = query?;
    let report = state.registry().report(&handle, query.limit).await?;
    Ok(Json(report))
}
