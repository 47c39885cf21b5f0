use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use crate::tmdb::{extract_year, MovieSummary, PersonSummary, TmdbApi};

mod session;
mod state;

pub use session::AutocompleteSession;
pub use state::{AutocompleteState, AutocompleteView, Bounds, InputEffect, Key};

pub const MIN_QUERY_CHARS: usize = 2;
pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const MAX_MOVIE_SUGGESTIONS: usize = 3;
pub const MAX_PERSON_SUGGESTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSuggestion {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonSuggestion {
    pub id: i64,
    pub name: String,
    pub profile_path: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Suggestion {
    Movie(MovieSuggestion),
    Person(PersonSuggestion),
}

/// Where selecting a suggestion leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Movie(i64),
    Person(i64),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Movie(id) => format!("/movie/{id}"),
            Route::Person(id) => format!("/person/{id}"),
        }
    }
}

impl Suggestion {
    pub fn route(&self) -> Route {
        match self {
            Suggestion::Movie(m) => Route::Movie(m.id),
            Suggestion::Person(p) => Route::Person(p.id),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Suggestion::Movie(m) => &m.title,
            Suggestion::Person(p) => &p.name,
        }
    }
}

impl From<&MovieSummary> for MovieSuggestion {
    fn from(m: &MovieSummary) -> Self {
        MovieSuggestion {
            id: m.id,
            title: m.title.clone(),
            poster_path: m.poster_path.clone(),
            year: m.release_date.as_deref().and_then(extract_year),
            rating: m.vote_average,
        }
    }
}

impl From<&PersonSummary> for PersonSuggestion {
    fn from(p: &PersonSummary) -> Self {
        PersonSuggestion {
            id: p.id,
            name: p.name.clone(),
            profile_path: p.profile_path.clone(),
            department: p.known_for_department.clone(),
        }
    }
}

/// The trimmed query, or `None` when it is too short to look up.
pub fn normalize_query(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.chars().count() >= MIN_QUERY_CHARS).then_some(trimmed)
}

/// Movies with posters then people with photos, API order preserved.
pub fn merge_suggestions(movies: &[MovieSummary], people: &[PersonSummary]) -> Vec<Suggestion> {
    let movies = movies
        .iter()
        .filter(|m| m.poster_path.is_some())
        .take(MAX_MOVIE_SUGGESTIONS)
        .map(|m| Suggestion::Movie(m.into()));
    let people = people
        .iter()
        .filter(|p| p.profile_path.is_some())
        .take(MAX_PERSON_SUGGESTIONS)
        .map(|p| Suggestion::Person(p.into()));
    movies.chain(people).collect()
}

/// Runs movie and person search side by side and merges what comes back.
///
/// A failed side is logged and counts as empty; the other side still shows.
pub async fn lookup_suggestions(tmdb: &dyn TmdbApi, query: &str) -> Vec<Suggestion> {
    let (movies, people) = tokio::join!(tmdb.search_movies(query, 1), tmdb.search_people(query, 1));
    let movies = movies.map(|p| p.results).unwrap_or_else(|e| {
        warn!("Movie suggestions for '{}' failed: {:#}", query, e);
        Vec::new()
    });
    let people = people.map(|p| p.results).unwrap_or_else(|e| {
        warn!("Person suggestions for '{}' failed: {:#}", query, e);
        Vec::new()
    });
    merge_suggestions(&movies, &people)
}
