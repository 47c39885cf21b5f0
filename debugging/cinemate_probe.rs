//! Exercise the TMDB client, the autocomplete session and the view projections
//! against the live API and print what a front end would receive.
//! Usage:
//!   cargo run --bin cinemate_probe -- suggest <text>
//!   cargo run --bin cinemate_probe -- movie <tmdb_id>
//!   cargo run --bin cinemate_probe -- person <tmdb_id>
//!   cargo run --bin cinemate_probe -- list <trending|popular|top_rated|now_playing|upcoming>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use chrono::Utc;
use cinemate::autocomplete::{AutocompleteSession, Key, DEBOUNCE};
use cinemate::tmdb::{MovieList, TmdbApi, TmdbClient};
use cinemate::views::{Listing, MovieDetailView, PersonDetailView};
use dotenvy::dotenv;
use serde::Serialize;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Suggest,
    Movie,
    Person,
    List,
}

impl FromStr for Command {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "suggest" => Ok(Command::Suggest),
            "movie" => Ok(Command::Movie),
            "person" => Ok(Command::Person),
            "list" => Ok(Command::List),
            _ => Err(anyhow::anyhow!(
                "command must be 'suggest', 'movie', 'person' or 'list'"
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run --bin cinemate_probe -- suggest <text>");
        eprintln!("       cargo run --bin cinemate_probe -- movie <tmdb_id>");
        eprintln!("       cargo run --bin cinemate_probe -- person <tmdb_id>");
        eprintln!("       cargo run --bin cinemate_probe -- list <list>");
        std::process::exit(1);
    }

    let command = Command::from_str(&args[1])?;
    let tmdb = Arc::new(TmdbClient::from_env()?);

    match command {
        Command::Suggest => suggest(tmdb, &args[2..].join(" ")).await?,
        Command::Movie => {
            let id: i64 = args[2].parse().context("tmdb_id must be an integer")?;
            let movie = tmdb.movie_details(id).await?;
            print_json(&MovieDetailView::from(&movie))?;
        }
        Command::Person => {
            let id: i64 = args[2].parse().context("tmdb_id must be an integer")?;
            let person = tmdb.person_details(id).await?;
            let view = PersonDetailView::build(&person, Utc::now().date_naive());
            if view.filmography.is_empty() {
                println!("No filmography available.");
            }
            for block in &view.filmography {
                println!("{} ({})", block.label, block.count);
                for film in &block.films {
                    match &film.character {
                        Some(character) => {
                            println!("  {} {} as {}", film.year, film.title, character)
                        }
                        None => println!("  {} {}", film.year, film.title),
                    }
                }
            }
        }
        Command::List => {
            let list = MovieList::from_str(&args[2])?;
            let page = tmdb.movie_list(list, 1).await?;
            print_json(&Listing::new(list.title(), &page.results))?;
        }
    }

    Ok(())
}

/// Types the text one character at a time, waits out the debounce, then
/// walks the dropdown with the arrow keys.
async fn suggest(tmdb: Arc<TmdbClient>, text: &str) -> Result<()> {
    let mut session = AutocompleteSession::new(tmdb);
    let mut updates = session.subscribe();
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        session.input(&typed);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let deadline = tokio::time::Instant::now() + DEBOUNCE + Duration::from_secs(10);
    while session.view().loading {
        tokio::time::timeout_at(deadline, updates.changed())
            .await
            .context("timed out waiting for suggestions")??;
    }

    let view = session.view();
    if view.suggestions.is_empty() {
        println!("No suggestions for '{}'", text.trim());
        return Ok(());
    }
    for (i, suggestion) in view.suggestions.iter().enumerate() {
        println!("{}. {}", i + 1, serde_json::to_string(suggestion)?);
    }
    session.key(Key::ArrowDown);
    if let Some(route) = session.key(Key::Enter) {
        println!("Enter on first suggestion -> {}", route.path());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
