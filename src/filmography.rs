use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::tmdb::{PersonCastCredit, PersonCrewCredit};

const ACTING_DEPARTMENT: &str = "Acting";
const ACTOR_LABEL: &str = "As Actor";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CreditRole {
    Cast { character: Option<String> },
    Crew { job: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credit {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub role: CreditRole,
    pub credit_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Cast,
    Crew,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmographySection {
    pub label: String,
    pub kind: SectionKind,
    pub credits: Vec<Credit>,
}

impl From<&PersonCastCredit> for Credit {
    fn from(c: &PersonCastCredit) -> Self {
        Credit {
            movie_id: c.id,
            title: c.title.clone(),
            poster_path: c.poster_path.clone(),
            release_date: c.release_date.clone(),
            role: CreditRole::Cast {
                character: c.character.clone(),
            },
            credit_id: c.credit_id.clone(),
        }
    }
}

impl From<&PersonCrewCredit> for Credit {
    fn from(c: &PersonCrewCredit) -> Self {
        Credit {
            movie_id: c.id,
            title: c.title.clone(),
            poster_path: c.poster_path.clone(),
            release_date: c.release_date.clone(),
            role: CreditRole::Crew { job: c.job.clone() },
            credit_id: c.credit_id.clone(),
        }
    }
}

impl Credit {
    /// Stable key for rendering lists; falls back to `{movie_id}-{index}`.
    pub fn render_key(&self, index: usize) -> String {
        self.credit_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.movie_id, index))
    }
}

/// The crew job a department most likely corresponds to.
fn primary_job(department: &str) -> Option<&'static str> {
    match department {
        "Directing" => Some("Director"),
        "Writing" => Some("Writer"),
        "Production" => Some("Producer"),
        _ => None,
    }
}

fn by_release_desc(a: &Credit, b: &Credit) -> Ordering {
    match (&a.release_date, &b.release_date) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn dedupe_by_movie(credits: impl IntoIterator<Item = Credit>) -> Vec<Credit> {
    let mut seen = HashSet::new();
    credits
        .into_iter()
        .filter(|c| seen.insert(c.movie_id))
        .collect()
}

/// Crew credits grouped by job, in first-encounter order of the job.
fn group_crew(crew: &[PersonCrewCredit]) -> Vec<(String, Vec<Credit>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Credit>)> = Vec::new();
    for credit in crew.iter().filter(|c| !c.job.trim().is_empty()) {
        let slot = *index.entry(credit.job.as_str()).or_insert_with(|| {
            groups.push((credit.job.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(Credit::from(credit));
    }
    groups
        .into_iter()
        .map(|(job, credits)| (job, dedupe_by_movie(credits)))
        .collect()
}

fn crew_section(job: String, credits: Vec<Credit>) -> FilmographySection {
    FilmographySection {
        label: format!("As {job}"),
        kind: SectionKind::Crew,
        credits,
    }
}

pub fn build_filmography(
    department: Option<&str>,
    cast: &[PersonCastCredit],
    crew: &[PersonCrewCredit],
) -> Vec<FilmographySection> {
    let department = department.unwrap_or_default();

    let mut groups = group_crew(crew);
    for (_, credits) in groups.iter_mut() {
        credits.sort_by(by_release_desc);
    }

    let mut cast_credits = dedupe_by_movie(cast.iter().map(Credit::from));
    cast_credits.sort_by(by_release_desc);

    let mut sections = Vec::new();

    if let Some(job) = primary_job(department) {
        if let Some(pos) = groups.iter().position(|(j, _)| j == job) {
            let (job, credits) = groups.remove(pos);
            sections.push(crew_section(job, credits));
        }
    }

    // sort_by is stable, so equal-sized groups keep their encounter order
    groups.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));
    sections.extend(
        groups
            .into_iter()
            .map(|(job, credits)| crew_section(job, credits)),
    );

    if !cast_credits.is_empty() {
        let section = FilmographySection {
            label: ACTOR_LABEL.to_string(),
            kind: SectionKind::Cast,
            credits: cast_credits,
        };
        if department == ACTING_DEPARTMENT {
            sections.insert(0, section);
        } else {
            sections.push(section);
        }
    }

    sections.retain(|s| !s.credits.is_empty());
    sections
}
