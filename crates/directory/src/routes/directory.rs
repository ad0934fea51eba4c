//! Directory page routes.
//!
//! JSON endpoints serving a page's render context and its search content.

use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
};

use crate::directory::{DirectoryContext, DirectoryQuery};
use crate::error::{AppError, AppResult};
use crate::models::DirectoryPage;
use crate::state::AppState;

/// Create the directory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/directory/{slug}", get(view_page))
        .route("/directory/{slug}/search-content", get(search_content))
}

async fn load_page(state: &AppState, slug: &str) -> AppResult<DirectoryPage> {
    state
        .directory()
        .find_page(slug)
        .await?
        .ok_or(AppError::NotFound)
}

/// Render context for one view of a directory page.
async fn view_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<DirectoryContext>> {
    let page = load_page(&state, &slug).await?;

    let service = state.directory();
    let query = DirectoryQuery::from_params(&params, service.page_key());
    let context = service.get_context(&page, &query).await?;

    Ok(Json(context))
}

/// Text fed to the search index for a directory page.
async fn search_content(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<String>>> {
    let page = load_page(&state, &slug).await?;
    let content = state.directory().get_search_content(&page).await?;

    Ok(Json(content))
}
