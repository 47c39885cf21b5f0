use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::config::Settings;

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieSummary>>;
    async fn search_people(&self, query: &str, page: u32) -> Result<Page<PersonSummary>>;
    async fn movie_details(&self, id: i64) -> Result<MovieFull>;
    async fn person_details(&self, id: i64) -> Result<PersonFull>;
    async fn movie_list(&self, list: MovieList, page: u32) -> Result<Page<MovieSummary>>;
}

/// Curated movie listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieList {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl MovieList {
    pub const ALL: [MovieList; 5] = [
        MovieList::Trending,
        MovieList::Popular,
        MovieList::TopRated,
        MovieList::NowPlaying,
        MovieList::Upcoming,
    ];

    fn path(&self) -> &'static str {
        match self {
            MovieList::Trending => "/trending/movie/week",
            MovieList::Popular => "/movie/popular",
            MovieList::TopRated => "/movie/top_rated",
            MovieList::NowPlaying => "/movie/now_playing",
            MovieList::Upcoming => "/movie/upcoming",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            MovieList::Trending => "trending",
            MovieList::Popular => "popular",
            MovieList::TopRated => "top_rated",
            MovieList::NowPlaying => "now_playing",
            MovieList::Upcoming => "upcoming",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MovieList::Trending => "Trending This Week",
            MovieList::Popular => "Popular",
            MovieList::TopRated => "Top Rated",
            MovieList::NowPlaying => "Now Showing",
            MovieList::Upcoming => "Coming Soon",
        }
    }
}

impl fmt::Display for MovieList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for MovieList {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trending" => Ok(MovieList::Trending),
            "popular" => Ok(MovieList::Popular),
            "top_rated" => Ok(MovieList::TopRated),
            "now_playing" => Ok(MovieList::NowPlaying),
            "upcoming" => Ok(MovieList::Upcoming),
            _ => Err(anyhow!("unknown movie list '{}'", s)),
        }
    }
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let user_agent = format!("cinemate/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.tmdb_api_key, &settings.tmdb_base_url)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_settings(&Settings::from_env()?)
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?api_key={}&language=en-US",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key)
        );
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Non-2xx responses are reported with the status and endpoint path only;
    /// the URL carries the API key and is never logged.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        debug!(endpoint = path, "TMDB request");
        let res = self
            .client
            .get(self.url(path, params))
            .send()
            .await
            .with_context(|| format!("TMDB request to {path} failed"))?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("TMDB API error: {} ({})", status.as_u16(), path));
        }
        let parsed: T = serde_json::from_str(&text)
            .with_context(|| format!("JSON parse failed for {path}"))?;
        Ok(parsed)
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieSummary>> {
        let params = [("query", query.to_string()), ("page", page.max(1).to_string())];
        self.get_json("/search/movie", &params).await
    }

    async fn search_people(&self, query: &str, page: u32) -> Result<Page<PersonSummary>> {
        let params = [("query", query.to_string()), ("page", page.max(1).to_string())];
        self.get_json("/search/person", &params).await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieFull> {
        let params = [("append_to_response", "credits,videos,similar".to_string())];
        self.get_json(&format!("/movie/{id}"), &params).await
    }

    async fn person_details(&self, id: i64) -> Result<PersonFull> {
        let params = [("append_to_response", "movie_credits".to_string())];
        self.get_json(&format!("/person/{id}"), &params).await
    }

    async fn movie_list(&self, list: MovieList, page: u32) -> Result<Page<MovieSummary>> {
        let params = [("page", page.max(1).to_string())];
        self.get_json(list.path(), &params).await
    }
}

/// Resolves an image path against the TMDB CDN; `None` when there is no path.
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}/{size}{p}"))
}

pub fn extract_year(date: &str) -> Option<String> {
    date.get(..4)
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(|y| y.to_string())
}

// TMDB sends "" for unknown dates and paths.
fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            page: 0,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn of(results: Vec<T>) -> Self {
        let total = u32::try_from(results.len()).unwrap_or(u32::MAX);
        Self {
            page: 1,
            results,
            total_pages: 1,
            total_results: total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub profile_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub known_for_department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub character: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub credit_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieFull {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: Videos,
    #[serde(default)]
    pub similar: Page<MovieSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonFull {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub birthday: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub deathday: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub place_of_birth: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub profile_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub movie_credits: MovieCredits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieCredits {
    #[serde(default)]
    pub cast: Vec<PersonCastCredit>,
    #[serde(default)]
    pub crew: Vec<PersonCrewCredit>,
}

/// A cast credit as listed on a person; `id` is the movie id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonCastCredit {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub character: Option<String>,
    #[serde(default)]
    pub credit_id: Option<String>,
}

/// A crew credit as listed on a person; `id` is the movie id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonCrewCredit {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub credit_id: Option<String>,
}
