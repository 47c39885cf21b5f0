use serde::Serialize;
use std::str::FromStr;

use super::{normalize_query, Route, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other,
}

impl FromStr for Key {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ArrowDown" => Key::ArrowDown,
            "ArrowUp" => Key::ArrowUp,
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            _ => Key::Other,
        })
    }
}

/// Bounding region of the search control, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// What the driver must do after an input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEffect {
    Cleared,
    Schedule { generation: u64, query: String },
}

/// Read-only snapshot for rendering the dropdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutocompleteView {
    pub text: String,
    pub suggestions: Vec<Suggestion>,
    pub open: bool,
    pub selected: Option<usize>,
    pub loading: bool,
}

/// Search-box state, changed only through its transition methods.
///
/// `generation` identifies the most recently issued lookup; a resolution
/// carrying any other generation is stale and dropped.
#[derive(Debug, Default)]
pub struct AutocompleteState {
    text: String,
    suggestions: Vec<Suggestion>,
    open: bool,
    selected: Option<usize>,
    loading: bool,
    generation: u64,
}

impl AutocompleteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn view(&self) -> AutocompleteView {
        AutocompleteView {
            text: self.text.clone(),
            suggestions: self.suggestions.clone(),
            open: self.open,
            selected: self.selected,
            loading: self.loading,
        }
    }

    pub fn input_changed(&mut self, text: &str) -> InputEffect {
        self.text = text.to_string();
        self.generation += 1;
        match normalize_query(text) {
            None => {
                self.suggestions.clear();
                self.open = false;
                self.selected = None;
                self.loading = false;
                InputEffect::Cleared
            }
            Some(query) => {
                self.loading = true;
                InputEffect::Schedule {
                    generation: self.generation,
                    query: query.to_string(),
                }
            }
        }
    }

    /// Returns `false` when the resolution is stale and was ignored.
    pub fn lookup_resolved(&mut self, generation: u64, suggestions: Vec<Suggestion>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.open = !suggestions.is_empty();
        self.suggestions = suggestions;
        self.selected = None;
        self.loading = false;
        true
    }

    pub fn key_pressed(&mut self, key: Key) -> Option<Route> {
        let len = self.suggestions.len();
        if !self.open || len == 0 {
            return None;
        }
        match key {
            Key::ArrowDown => {
                self.selected = Some(self.selected.map_or(0, |i| (i + 1) % len));
                None
            }
            Key::ArrowUp => {
                self.selected = Some(match self.selected {
                    None | Some(0) => len - 1,
                    Some(i) => i - 1,
                });
                None
            }
            Key::Enter => {
                let route = self
                    .selected
                    .and_then(|i| self.suggestions.get(i))
                    .map(Suggestion::route)?;
                self.close();
                Some(route)
            }
            Key::Escape => {
                self.close();
                None
            }
            Key::Other => None,
        }
    }

    pub fn pointer_down(&mut self, bounds: &Bounds, x: f64, y: f64) {
        if !bounds.contains(x, y) {
            self.close();
        }
    }

    pub fn suggestion_clicked(&mut self, index: usize) -> Option<Route> {
        let route = self.suggestions.get(index).map(Suggestion::route)?;
        self.close();
        Some(route)
    }

    /// Form submission: closes the dropdown, drops any pending lookup and
    /// hands back the query for a full search.
    pub fn submitted(&mut self) -> Option<String> {
        self.generation += 1;
        self.loading = false;
        self.close();
        let query = self.text.trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    pub fn close(&mut self) {
        self.open = false;
        self.selected = None;
    }
}
