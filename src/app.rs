use crate::autocomplete::{lookup_suggestions, normalize_query, Suggestion};
use crate::config::Settings;
use crate::tmdb::{MovieList, TmdbApi, TmdbClient};
use crate::views::{Listing, MovieDetailView, PersonDetailView};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    pub page: Option<u32>,
}

pub async fn run_server() -> Result<()> {
    let settings = Settings::from_env()?;
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::from_settings(&settings)?);
    let app = build_router(AppState { tmdb });

    info!("Listening on {}", settings.bind_addr);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/movies/:list", get(movie_list))
        .route("/api/search", get(search))
        .route("/api/suggestions", get(suggestions))
        .route("/api/movie/:id", get(movie_detail))
        .route("/api/person/:id", get(person_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "error", "message": message}))).into_response()
}

async fn movie_list(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Query(params): Query<PageQuery>,
) -> Response {
    let list: MovieList = match list.parse() {
        Ok(l) => l,
        Err(e) => {
            warn!("Rejecting listing request: {}", e);
            return error_response(StatusCode::NOT_FOUND, "Unknown movie list");
        }
    };
    let movies = match state.tmdb.movie_list(list, params.page.unwrap_or(1)).await {
        Ok(page) => page.results,
        Err(e) => {
            warn!("Failed to load {} movies: {:#}", list, e);
            Vec::new()
        }
    };
    Json(Listing::new(list.title(), &movies)).into_response()
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> Response {
    let query = params.query.trim();
    if query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Query must not be empty");
    }
    let movies = match state
        .tmdb
        .search_movies(query, params.page.unwrap_or(1))
        .await
    {
        Ok(page) => page.results,
        Err(e) => {
            warn!("Search for '{}' failed: {:#}", query, e);
            Vec::new()
        }
    };
    Json(Listing::new(format!("Results for \"{query}\""), &movies)).into_response()
}

async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<Suggestion>> {
    let Some(query) = normalize_query(&params.query) else {
        return Json(Vec::new());
    };
    Json(lookup_suggestions(state.tmdb.as_ref(), query).await)
}

async fn movie_detail(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.tmdb.movie_details(id).await {
        Ok(movie) => Json(MovieDetailView::from(&movie)).into_response(),
        Err(e) => {
            warn!("Failed to load movie {}: {:#}", id, e);
            error_response(StatusCode::NOT_FOUND, "Movie not found.")
        }
    }
}

async fn person_detail(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.tmdb.person_details(id).await {
        Ok(person) => {
            let today = Utc::now().date_naive();
            Json(PersonDetailView::build(&person, today)).into_response()
        }
        Err(e) => {
            warn!("Failed to load person {}: {:#}", id, e);
            error_response(StatusCode::NOT_FOUND, "Person not found.")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
