use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use cinemate::app::{build_router, AppState};
use cinemate::tmdb::{
    MovieFull, MovieList, MovieSummary, Page, PersonFull, PersonSummary, TmdbApi,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

#[derive(Default)]
struct FakeTmdb {
    calls: Mutex<Vec<String>>,
    failing: HashSet<&'static str>,
}

impl FakeTmdb {
    fn failing(endpoints: &[&'static str]) -> Self {
        Self {
            failing: endpoints.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn record(&self, call: &'static str, arg: impl ToString) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{call}:{}", arg.to_string()));
        if self.failing.contains(call) {
            anyhow::bail!("TMDB API error: 503 ({call})");
        }
        Ok(())
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn movie_results() -> Vec<MovieSummary> {
    serde_json::from_value(json!([
        {"id": 1, "title": "Ali", "poster_path": "/ali.jpg", "release_date": "2001-12-25", "vote_average": 6.84},
        {"id": 2, "title": "Ali G Indahouse", "poster_path": "", "release_date": "2002-03-22", "vote_average": 5.9},
        {"id": 3, "title": "Alice", "poster_path": "/alice.jpg", "release_date": "", "vote_average": 7.0},
        {"id": 4, "title": "Alien", "poster_path": "/alien.jpg", "release_date": "1979-05-25", "vote_average": 8.1},
        {"id": 5, "title": "Aliens", "poster_path": "/aliens.jpg", "release_date": "1986-07-18", "vote_average": 7.9}
    ]))
    .unwrap()
}

fn people_results() -> Vec<PersonSummary> {
    serde_json::from_value(json!([
        {"id": 10, "name": "Ali Wong", "profile_path": "/wong.jpg", "known_for_department": "Acting"},
        {"id": 11, "name": "Mahershala Ali", "profile_path": null, "known_for_department": "Acting"},
        {"id": 12, "name": "Ali Abbasi", "profile_path": "/abbasi.jpg", "known_for_department": "Directing"},
        {"id": 13, "name": "Ali Larter", "profile_path": "/larter.jpg", "known_for_department": "Acting"}
    ]))
    .unwrap()
}

fn movie_full() -> MovieFull {
    serde_json::from_value(json!({
        "id": 4,
        "title": "Alien",
        "tagline": "In space no one can hear you scream.",
        "overview": "The crew of a commercial spacecraft...",
        "poster_path": "/alien.jpg",
        "backdrop_path": "/alien-bg.jpg",
        "release_date": "1979-05-25",
        "runtime": 117,
        "vote_average": 8.14,
        "genres": [{"id": 27, "name": "Horror"}, {"id": 878, "name": "Science Fiction"}],
        "credits": {
            "cast": [
                {"id": 10205, "name": "Sigourney Weaver", "character": "Ellen Ripley", "profile_path": "/sw.jpg", "credit_id": "c1"}
            ],
            "crew": [
                {"id": 578, "name": "Ridley Scott", "job": "Director", "department": "Directing"},
                {"id": 579, "name": "Dan O'Bannon", "job": "Screenplay", "department": "Writing"}
            ]
        },
        "videos": {"results": [
            {"key": "LjLamj-b0I8", "name": "Alien Trailer", "site": "YouTube", "type": "Trailer"}
        ]},
        "similar": {"page": 1, "results": [
            {"id": 5, "title": "Aliens", "poster_path": "/aliens.jpg", "release_date": "1986-07-18", "vote_average": 7.9}
        ]}
    }))
    .unwrap()
}

fn person_full() -> PersonFull {
    serde_json::from_value(json!({
        "id": 578,
        "name": "Ridley Scott",
        "biography": "Sir Ridley Scott is an English filmmaker.",
        "birthday": "1937-11-30",
        "deathday": null,
        "place_of_birth": "South Shields, County Durham, England, UK",
        "profile_path": "/rs.jpg",
        "known_for_department": "Directing",
        "movie_credits": {
            "cast": [
                {"id": 900, "title": "Cameo", "release_date": "2005-01-01", "character": "Himself", "credit_id": "k1"}
            ],
            "crew": [
                {"id": 4, "title": "Alien", "release_date": "1979-05-25", "job": "Director", "credit_id": "a"},
                {"id": 78, "title": "Blade Runner", "release_date": "1982-06-25", "job": "Director", "credit_id": "b"},
                {"id": 98, "title": "Gladiator", "release_date": "2000-05-01", "job": "Producer", "credit_id": "c"},
                {"id": 98, "title": "Gladiator", "release_date": "2000-05-01", "job": "Producer", "credit_id": "d"},
                {"id": 98, "title": "Gladiator", "release_date": "2000-05-01", "job": "Director", "credit_id": "e"}
            ]
        }
    }))
    .unwrap()
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn search_movies(&self, query: &str, _page: u32) -> anyhow::Result<Page<MovieSummary>> {
        self.record("search_movies", query)?;
        Ok(Page::of(movie_results()))
    }

    async fn search_people(&self, query: &str, _page: u32) -> anyhow::Result<Page<PersonSummary>> {
        self.record("search_people", query)?;
        Ok(Page::of(people_results()))
    }

    async fn movie_details(&self, id: i64) -> anyhow::Result<MovieFull> {
        self.record("movie_details", id)?;
        Ok(movie_full())
    }

    async fn person_details(&self, id: i64) -> anyhow::Result<PersonFull> {
        self.record("person_details", id)?;
        Ok(person_full())
    }

    async fn movie_list(&self, list: MovieList, page: u32) -> anyhow::Result<Page<MovieSummary>> {
        self.record("movie_list", format!("{list}/{page}"))?;
        Ok(Page::of(movie_results()))
    }
}

fn app(tmdb: FakeTmdb) -> (Router, Arc<FakeTmdb>) {
    let tmdb = Arc::new(tmdb);
    (build_router(AppState { tmdb: tmdb.clone() }), tmdb)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).expect("valid request"))
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app(FakeTmdb::default());
    let res = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn suggestions_merge_three_movies_and_two_people() {
    let (app, _) = app(FakeTmdb::default());
    let (status, body) = get(app, "/api/suggestions?query=ali").await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    let summary: Vec<(String, i64)> = items
        .iter()
        .map(|s| (s["kind"].as_str().unwrap().to_string(), s["id"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("movie".to_string(), 1),
            ("movie".to_string(), 3),
            ("movie".to_string(), 4),
            ("person".to_string(), 10),
            ("person".to_string(), 12),
        ]
    );
    assert_eq!(items[0]["year"], "2001");
    assert_eq!(items[1]["year"], Value::Null);
    assert_eq!(items[4]["department"], "Directing");
}

#[tokio::test]
async fn short_suggestion_query_skips_tmdb() {
    let (app, tmdb) = app(FakeTmdb::default());
    let (status, body) = get(app, "/api/suggestions?query=%20a%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert_eq!(tmdb.call_count(), 0);
}

#[tokio::test]
async fn suggestions_survive_person_search_failure() {
    let (app, _) = app(FakeTmdb::failing(&["search_people"]));
    let (status, body) = get(app, "/api/suggestions?query=ali").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|s| s["kind"] == "movie"));
}

#[tokio::test]
async fn suggestions_empty_when_both_searches_fail() {
    let (app, _) = app(FakeTmdb::failing(&["search_people", "search_movies"]));
    let (status, body) = get(app, "/api/suggestions?query=ali").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn listing_uses_named_list_and_page() {
    let (app, tmdb) = app(FakeTmdb::default());
    let (status, body) = get(app, "/api/movies/now-playing?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Now Showing");
    assert_eq!(body["movies"].as_array().unwrap().len(), 5);
    assert_eq!(body["movies"][1]["poster_url"], Value::Null);
    assert_eq!(body["movies"][2]["year"], "—");
    assert_eq!(body["movies"][0]["rating"], "6.8");
    assert_eq!(
        tmdb.calls.lock().unwrap().as_slice(),
        ["movie_list:now_playing/2".to_string()]
    );
}

#[tokio::test]
async fn unknown_listing_is_not_found() {
    let (app, tmdb) = app(FakeTmdb::default());
    let (status, _) = get(app, "/api/movies/classics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(tmdb.call_count(), 0);
}

#[tokio::test]
async fn listing_failure_degrades_to_empty() {
    let (app, _) = app(FakeTmdb::failing(&["movie_list"]));
    let (status, body) = get(app, "/api/movies/popular").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"], json!([]));
}

#[tokio::test]
async fn full_search_requires_a_query() {
    let (app, _) = app(FakeTmdb::default());
    let (status, _) = get(app.clone(), "/api/search?query=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(app, "/api/search?query=ali").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Results for \"ali\"");
    assert_eq!(body["movies"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn movie_detail_projection() {
    let (app, _) = app(FakeTmdb::default());
    let (status, body) = get(app, "/api/movie/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Alien");
    assert_eq!(body["rating"], "8.1");
    assert_eq!(body["runtime_minutes"], 117);
    assert_eq!(body["directors"], json!(["Ridley Scott"]));
    assert_eq!(
        body["trailer"]["embed_url"],
        "https://www.youtube.com/embed/LjLamj-b0I8"
    );
    assert_eq!(
        body["backdrop_url"],
        "https://image.tmdb.org/t/p/original/alien-bg.jpg"
    );
    assert_eq!(body["cast"][0]["character"], "Ellen Ripley");
    assert_eq!(body["similar"][0]["id"], 5);
}

#[tokio::test]
async fn movie_failure_is_not_found() {
    let (app, _) = app(FakeTmdb::failing(&["movie_details"]));
    let (status, body) = get(app, "/api/movie/4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Movie not found.");
}

#[tokio::test]
async fn person_detail_orders_filmography() {
    let (app, _) = app(FakeTmdb::default());
    let (status, body) = get(app, "/api/person/578").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["born"], "November 30, 1937");
    assert_eq!(body["died"], Value::Null);
    assert_eq!(body["biography_is_long"], false);

    let sections = body["filmography"].as_array().unwrap();
    let labels: Vec<&str> = sections
        .iter()
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["As Director", "As Producer", "As Actor"]);

    let director_ids: Vec<i64> = sections[0]["films"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["movie_id"].as_i64().unwrap())
        .collect();
    assert_eq!(director_ids, vec![98, 78, 4]);
    assert_eq!(sections[1]["count"], 1);
    assert_eq!(sections[1]["films"][0]["key"], "c");
    assert_eq!(sections[2]["kind"], "cast");
    assert_eq!(sections[2]["films"][0]["character"], "Himself");
}

#[tokio::test]
async fn person_failure_is_not_found() {
    let (app, _) = app(FakeTmdb::failing(&["person_details"]));
    let (status, body) = get(app, "/api/person/578").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Person not found.");
}
