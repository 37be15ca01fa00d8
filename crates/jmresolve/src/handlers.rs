use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use jmdict_db::DictionaryIndex;
use jmdict_types::{DictionaryEntry, EntryId, Fragment, parse_mecab_output};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::resolver::{ResolvedEntry, resolve_all};

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<DictionaryIndex>,
    pub max_fragments: usize,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub term: String,
}

/// Exactly one of the two inputs must be present.
#[derive(Deserialize)]
pub struct ResolveRequest {
    pub fragments: Option<Vec<Fragment>>,
    /// Raw `mecab` output, one token per line.
    pub mecab: Option<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    count: usize,
    entries: Vec<ResolvedView>,
}

#[derive(Serialize)]
struct ResolvedView {
    #[serde(flatten)]
    entry: ResolvedEntry,
    kanji: Vec<String>,
    readings: Vec<String>,
    glosses: Vec<String>,
}

impl From<ResolvedEntry> for ResolvedView {
    fn from(entry: ResolvedEntry) -> Self {
        let owned = |forms: Vec<&str>| forms.into_iter().map(str::to_string).collect();
        let kanji = owned(entry.kanji_forms());
        let readings = owned(entry.reading_forms());
        let glosses = owned(entry.glosses());
        ResolvedView {
            entry,
            kanji,
            readings,
            glosses,
        }
    }
}

#[derive(Serialize)]
struct LookupResponse<'a> {
    term: &'a str,
    entries: Vec<LookupHit<'a>>,
}

#[derive(Serialize)]
struct LookupHit<'a> {
    id: EntryId,
    #[serde(flatten)]
    entry: &'a DictionaryEntry,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/stats", get(stats))
        .route("/v1/lookup", get(lookup))
        .route("/v1/resolve", post(resolve))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn stats(State(state): State<AppState>) -> Response {
    Json(state.index.stats()).into_response()
}

/// Raw index lookup: kanji matches first, then reading matches not already listed.
async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    let term = params.term.trim();
    if term.is_empty() {
        return Err(ApiError::bad_request("term is required"));
    }

    let index = &state.index;
    let reading = index.normalizer().normalize(term);
    let mut ids: Vec<EntryId> = index.lookup_by_kanji(term).unwrap_or_default().to_vec();
    for &id in index.lookup_by_reading(&reading).unwrap_or_default() {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let entries = ids
        .into_iter()
        .filter_map(|id| index.entry(id).map(|entry| LookupHit { id, entry }))
        .collect();
    Ok(Json(LookupResponse { term, entries }).into_response())
}

async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let fragments = match (request.fragments, request.mecab) {
        (Some(fragments), None) => fragments,
        (None, Some(text)) => parse_mecab_output(&text),
        _ => {
            return Err(ApiError::bad_request(
                "exactly one of fragments or mecab is required",
            ));
        }
    };
    if fragments.len() > state.max_fragments {
        return Err(ApiError::bad_request(format!(
            "at most {} fragments per request",
            state.max_fragments
        )));
    }

    let resolved = resolve_all(&fragments, &state.index);
    debug!(
        "resolved {} of {} fragments",
        resolved.len(),
        fragments.len()
    );
    let entries: Vec<ResolvedView> = resolved.into_iter().map(ResolvedView::from).collect();
    Ok(Json(ResolveResponse {
        count: entries.len(),
        entries,
    }))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
