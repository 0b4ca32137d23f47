//! Informational page endpoints.
//!
//! Pages are markdown rendered at startup; these handlers only project the
//! in-memory store as JSON for the React layer.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::content::Page;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Index entry for a page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A full rendered page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBody {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::NaiveDate>,
    pub html: String,
}

impl From<&Page> for PageBody {
    fn from(page: &Page) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.meta.title.clone(),
            description: page.meta.description.clone(),
            updated_at: page.meta.updated_at,
            html: page.content_html.clone(),
        }
    }
}

/// `GET /api/pages` - list all informational pages.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<PageSummary>> {
    let mut pages: Vec<PageSummary> = state
        .content()
        .get_all_pages()
        .map(|page| PageSummary {
            slug: page.slug.clone(),
            title: page.meta.title.clone(),
            description: page.meta.description.clone(),
        })
        .collect();
    pages.sort_by(|a, b| a.slug.cmp(&b.slug));
    Json(pages)
}

/// `GET /api/pages/{slug}` - one rendered page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<PageBody>> {
    state
        .content()
        .get_page(&slug)
        .map(|page| Json(PageBody::from(page)))
        .ok_or(AppError::NotFound(slug))
}
