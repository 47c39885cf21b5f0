use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::filmography::{build_filmography, CreditRole, FilmographySection, SectionKind};
use crate::tmdb::{extract_year, image_url, MovieFull, MovieSummary, PersonFull, Videos};

pub const MISSING_YEAR: &str = "—";
const MAX_CAST: usize = 10;
const BIO_CLAMP_CHARS: usize = 350;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub year: String,
    pub rating: String,
}

impl From<&MovieSummary> for MovieCard {
    fn from(m: &MovieSummary) -> Self {
        MovieCard {
            id: m.id,
            title: m.title.clone(),
            poster_url: image_url(m.poster_path.as_deref(), "w342"),
            year: year_or_placeholder(m.release_date.as_deref()),
            rating: format_rating(m.vote_average),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub title: String,
    pub movies: Vec<MovieCard>,
}

impl Listing {
    pub fn new(title: impl Into<String>, movies: &[MovieSummary]) -> Self {
        Listing {
            title: title.into(),
            movies: movies.iter().map(MovieCard::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastCard {
    pub id: i64,
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trailer {
    pub name: String,
    pub embed_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetailView {
    pub id: i64,
    pub title: String,
    pub tagline: Option<String>,
    pub backdrop_url: Option<String>,
    pub poster_url: Option<String>,
    pub rating: String,
    pub year: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub overview: Option<String>,
    pub cast: Vec<CastCard>,
    pub trailer: Option<Trailer>,
    pub similar: Vec<MovieCard>,
}

impl From<&MovieFull> for MovieDetailView {
    fn from(movie: &MovieFull) -> Self {
        let directors = movie
            .credits
            .crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.clone())
            .collect();
        let cast = movie
            .credits
            .cast
            .iter()
            .take(MAX_CAST)
            .map(|c| CastCard {
                id: c.id,
                name: c.name.clone(),
                character: c.character.clone(),
                profile_url: image_url(c.profile_path.as_deref(), "w185"),
            })
            .collect();

        MovieDetailView {
            id: movie.id,
            title: movie.title.clone(),
            tagline: movie.tagline.clone(),
            backdrop_url: image_url(movie.backdrop_path.as_deref(), "original"),
            poster_url: image_url(movie.poster_path.as_deref(), "w500"),
            rating: format_rating(movie.vote_average),
            year: movie.release_date.as_deref().and_then(extract_year),
            runtime_minutes: movie.runtime.filter(|r| *r > 0),
            genres: movie.genres.iter().map(|g| g.name.clone()).collect(),
            directors,
            overview: Some(movie.overview.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string),
            cast,
            trailer: select_trailer(&movie.videos),
            similar: movie.similar.results.iter().map(MovieCard::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmCard {
    pub movie_id: i64,
    pub key: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub year: String,
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmographyBlock {
    pub label: String,
    pub kind: SectionKind,
    pub count: usize,
    pub films: Vec<FilmCard>,
}

impl From<FilmographySection> for FilmographyBlock {
    fn from(section: FilmographySection) -> Self {
        let films = section
            .credits
            .iter()
            .enumerate()
            .map(|(i, credit)| FilmCard {
                movie_id: credit.movie_id,
                key: credit.render_key(i),
                title: credit.title.clone(),
                poster_url: image_url(credit.poster_path.as_deref(), "w342"),
                year: year_or_placeholder(credit.release_date.as_deref()),
                character: match &credit.role {
                    CreditRole::Cast { character } => character.clone(),
                    CreditRole::Crew { .. } => None,
                },
            })
            .collect::<Vec<_>>();
        FilmographyBlock {
            label: section.label,
            kind: section.kind,
            count: films.len(),
            films,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetailView {
    pub id: i64,
    pub name: String,
    pub profile_url: Option<String>,
    pub initial: Option<char>,
    pub known_for: Option<String>,
    pub born: Option<String>,
    pub died: Option<String>,
    pub age: Option<i32>,
    pub birthplace: Option<String>,
    pub biography: Option<String>,
    pub biography_is_long: bool,
    pub filmography: Vec<FilmographyBlock>,
}

impl PersonDetailView {
    /// `today` anchors the age of living people.
    pub fn build(person: &PersonFull, today: NaiveDate) -> Self {
        let birthday = person.birthday.as_deref().and_then(parse_date);
        let deathday = person.deathday.as_deref().and_then(parse_date);
        let age = birthday.map(|b| age_between(b, deathday.unwrap_or(today)));
        let biography = Some(person.biography.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_string);
        let biography_is_long = biography
            .as_deref()
            .map(|b| b.chars().count() > BIO_CLAMP_CHARS)
            .unwrap_or(false);

        let filmography = build_filmography(
            person.known_for_department.as_deref(),
            &person.movie_credits.cast,
            &person.movie_credits.crew,
        )
        .into_iter()
        .map(FilmographyBlock::from)
        .collect();

        PersonDetailView {
            id: person.id,
            name: person.name.clone(),
            profile_url: image_url(person.profile_path.as_deref(), "h632"),
            initial: person.name.chars().next(),
            known_for: person.known_for_department.clone(),
            born: birthday.map(format_long_date),
            died: deathday.map(format_long_date),
            age,
            birthplace: person.place_of_birth.clone(),
            biography,
            biography_is_long,
            filmography,
        }
    }
}

pub fn format_rating(vote_average: f64) -> String {
    format!("{vote_average:.1}")
}

fn year_or_placeholder(date: Option<&str>) -> String {
    date.and_then(extract_year)
        .unwrap_or_else(|| MISSING_YEAR.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Whole years elapsed, not counting a birthday that has not come yet.
pub fn age_between(birth: NaiveDate, end: NaiveDate) -> i32 {
    let mut age = end.year() - birth.year();
    if (end.month(), end.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn select_trailer(videos: &Videos) -> Option<Trailer> {
    videos
        .results
        .iter()
        .find(|v| v.site.eq_ignore_ascii_case("YouTube") && v.video_type == "Trailer")
        .map(|v| Trailer {
            name: v.name.clone(),
            embed_url: format!("https://www.youtube.com/embed/{}", v.key),
        })
}
