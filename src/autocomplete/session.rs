use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::state::{AutocompleteState, AutocompleteView, Bounds, InputEffect, Key};
use super::{lookup_suggestions, Route, DEBOUNCE};
use crate::tmdb::TmdbApi;

type SharedState = Arc<Mutex<AutocompleteState>>;

fn lock(state: &Mutex<AutocompleteState>) -> MutexGuard<'_, AutocompleteState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives an [`AutocompleteState`] for one search field.
///
/// At most one debounce timer is pending at a time. Once a timer fires, its
/// lookup runs detached and is never aborted; superseded results are dropped
/// by the generation check instead.
pub struct AutocompleteSession {
    tmdb: Arc<dyn TmdbApi>,
    state: SharedState,
    updates: Arc<watch::Sender<AutocompleteView>>,
    timer: Option<JoinHandle<()>>,
    debounce: Duration,
}

impl AutocompleteSession {
    pub fn new(tmdb: Arc<dyn TmdbApi>) -> Self {
        Self::with_debounce(tmdb, DEBOUNCE)
    }

    pub fn with_debounce(tmdb: Arc<dyn TmdbApi>, debounce: Duration) -> Self {
        let (updates, _) = watch::channel(AutocompleteView::default());
        Self {
            tmdb,
            state: Arc::new(Mutex::new(AutocompleteState::new())),
            updates: Arc::new(updates),
            timer: None,
            debounce,
        }
    }

    /// Receives a fresh snapshot after every visible change.
    pub fn subscribe(&self) -> watch::Receiver<AutocompleteView> {
        self.updates.subscribe()
    }

    pub fn view(&self) -> AutocompleteView {
        lock(&self.state).view()
    }

    pub fn input(&mut self, text: &str) {
        let effect = self.update(|state| state.input_changed(text));
        self.cancel_timer();
        if let InputEffect::Schedule { generation, query } = effect {
            let tmdb = self.tmdb.clone();
            let state = self.state.clone();
            let updates = self.updates.clone();
            let debounce = self.debounce;
            self.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                tokio::spawn(run_lookup(tmdb, state, updates, generation, query));
            }));
        }
    }

    pub fn key(&mut self, key: Key) -> Option<Route> {
        self.update(|state| state.key_pressed(key))
    }

    pub fn pointer_down(&mut self, bounds: &Bounds, x: f64, y: f64) {
        self.update(|state| state.pointer_down(bounds, x, y));
    }

    pub fn click(&mut self, index: usize) -> Option<Route> {
        self.update(|state| state.suggestion_clicked(index))
    }

    pub fn submit(&mut self) -> Option<String> {
        self.cancel_timer();
        self.update(AutocompleteState::submitted)
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Applies a transition and publishes the resulting snapshot under one lock,
    /// so snapshots reach subscribers in the order the transitions happened.
    fn update<R>(&self, transition: impl FnOnce(&mut AutocompleteState) -> R) -> R {
        let mut guard = lock(&self.state);
        let result = transition(&mut *guard);
        self.updates.send_replace(guard.view());
        result
    }
}

impl Drop for AutocompleteSession {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn run_lookup(
    tmdb: Arc<dyn TmdbApi>,
    state: SharedState,
    updates: Arc<watch::Sender<AutocompleteView>>,
    generation: u64,
    query: String,
) {
    debug!(generation, query = %query, "Autocomplete lookup");
    let suggestions = lookup_suggestions(tmdb.as_ref(), &query).await;
    let mut guard = lock(&state);
    if guard.lookup_resolved(generation, suggestions) {
        updates.send_replace(guard.view());
    } else {
        debug!(generation, "Discarding stale autocomplete result for '{}'", query);
    }
}
