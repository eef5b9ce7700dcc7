//! The view-state machine. `ViewController` owns everything the screen is
//! derived from: which view is active, what has been loaded, and what the
//! user has typed or picked. Inputs mutate it synchronously and may ask for a
//! fetch by returning an [`Effect`]; fetch results come back through
//! [`ViewController::apply`], which drops anything that no longer matches the
//! current view.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogUnavailable;
use crate::filter::filter_shows;
use crate::models::{Episode, Show, ShowId};
use crate::selection::{EpisodeSelection, SelectionRegistry};

/// The two mutually exclusive views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Shows,
    Episodes,
}

/// User events reported by the render boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    ShowPicked(ShowId),
    SearchChanged(String),
    EpisodeSelected(EpisodeSelection),
    Back,
    Retry,
}

/// Fetch work requested by a transition. The caller runs it and reports the
/// outcome as a [`Fetched`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchShows,
    FetchEpisodes(ShowId),
}

/// Completed fetches.
#[derive(Debug, Clone)]
pub enum Fetched {
    Shows(Result<Arc<Vec<Show>>, CatalogUnavailable>),
    Episodes {
        show_id: ShowId,
        result: Result<Arc<Vec<Episode>>, CatalogUnavailable>,
    },
}

/// Progress of one list load.
#[derive(Debug)]
enum Load<T> {
    Idle,
    Loading,
    Ready(Arc<Vec<T>>),
    Failed(CatalogUnavailable),
}

impl<T> Load<T> {
    fn items(&self) -> &[T] {
        match self {
            Load::Ready(items) => items.as_slice(),
            _ => &[],
        }
    }

    fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    fn is_failed(&self) -> bool {
        matches!(self, Load::Failed(_))
    }

    fn status(&self, visible: usize) -> ListStatus {
        match self {
            Load::Idle | Load::Loading => ListStatus::Loading,
            Load::Failed(err) => ListStatus::Failed(err.reason.clone()),
            Load::Ready(_) if visible == 0 => ListStatus::Empty,
            Load::Ready(_) => ListStatus::Ready,
        }
    }
}

/// What the visible list currently amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
    /// Loaded, but the term or selection leaves nothing to show.
    Empty,
    Failed(String),
}

/// Everything the render boundary needs to draw one frame.
#[derive(Debug)]
pub enum RenderView<'a> {
    Shows {
        items: Vec<&'a Show>,
        total: usize,
        term: &'a str,
        status: ListStatus,
    },
    Episodes {
        show: Option<&'a Show>,
        items: Vec<&'a Episode>,
        /// Full loaded list, for the episode selector.
        all: &'a [Episode],
        selection: EpisodeSelection,
        term: &'a str,
        status: ListStatus,
    },
}

#[derive(Debug)]
pub struct ViewController {
    view: View,
    shows: Load<Show>,
    show_term: String,
    selection: SelectionRegistry,
    episodes: Load<Episode>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            view: View::Shows,
            shows: Load::Idle,
            show_term: String::new(),
            selection: SelectionRegistry::new(),
            episodes: Load::Idle,
        }
    }

    /// Kick off the initial show list load.
    pub fn start(&mut self) -> Effect {
        self.shows = Load::Loading;
        Effect::FetchShows
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected_show_id(&self) -> Option<ShowId> {
        self.selection.show_id()
    }

    pub fn episode_selection(&self) -> EpisodeSelection {
        self.selection.episode()
    }

    /// Search term of the active view.
    pub fn term(&self) -> &str {
        match self.view {
            View::Shows => &self.show_term,
            View::Episodes => self.selection.term(),
        }
    }

    pub fn all_shows(&self) -> &[Show] {
        self.shows.items()
    }

    pub fn show(&self, id: ShowId) -> Option<&Show> {
        self.all_shows().iter().find(|show| show.id == id)
    }

    pub fn all_episodes(&self) -> &[Episode] {
        self.episodes.items()
    }

    pub fn visible_shows(&self) -> Vec<&Show> {
        filter_shows(self.all_shows(), &self.show_term)
    }

    pub fn visible_episodes(&self) -> Vec<&Episode> {
        match self.view {
            View::Episodes => self.selection.visible(self.all_episodes()),
            View::Shows => Vec::new(),
        }
    }

    /// Dispatch one user event. Inputs that make no sense in the current
    /// view are ignored.
    pub fn handle(&mut self, input: Input) -> Option<Effect> {
        match (self.view, input) {
            (_, Input::ShowPicked(id)) => self.pick_show(id),
            (View::Shows, Input::SearchChanged(term)) => {
                self.show_term = term;
                None
            }
            (View::Episodes, Input::SearchChanged(term)) => {
                self.selection.set_term(term);
                None
            }
            (View::Episodes, Input::EpisodeSelected(selection)) => {
                self.selection.select_episode(selection);
                None
            }
            (View::Episodes, Input::Back) => {
                debug!(show_id = ?self.selection.show_id(), "leaving episode view");
                self.view = View::Shows;
                self.selection.clear();
                self.episodes = Load::Idle;
                None
            }
            (View::Shows, Input::Retry) if self.shows.is_failed() => {
                self.shows = Load::Loading;
                Some(Effect::FetchShows)
            }
            (View::Episodes, Input::Retry) if self.episodes.is_failed() => {
                let show_id = self.selection.show_id()?;
                self.episodes = Load::Loading;
                Some(Effect::FetchEpisodes(show_id))
            }
            (view, input) => {
                debug!(?view, ?input, "input ignored in current view");
                None
            }
        }
    }

    fn pick_show(&mut self, id: ShowId) -> Option<Effect> {
        if self.show(id).is_none() {
            warn!(show_id = id, "picked show is not in the loaded list");
            return None;
        }
        info!(show_id = id, "opening episode view");
        self.view = View::Episodes;
        self.selection.select_show(id);
        self.episodes = Load::Loading;
        Some(Effect::FetchEpisodes(id))
    }

    /// Record a finished fetch. Returns `false` when the result is stale and
    /// was discarded.
    pub fn apply(&mut self, fetched: Fetched) -> bool {
        match fetched {
            Fetched::Shows(result) => {
                if !self.shows.is_loading() {
                    debug!("discarding unexpected show list result");
                    return false;
                }
                self.shows = match result {
                    Ok(shows) => {
                        info!(count = shows.len(), "show list loaded");
                        Load::Ready(shows)
                    }
                    Err(err) => {
                        warn!(error = %err, "show list failed to load");
                        Load::Failed(err)
                    }
                };
                true
            }
            Fetched::Episodes { show_id, result } => {
                let current = self.view == View::Episodes
                    && self.selection.show_id() == Some(show_id)
                    && self.episodes.is_loading();
                if !current {
                    debug!(show_id, "discarding stale episode result");
                    return false;
                }
                self.episodes = match result {
                    Ok(episodes) => {
                        info!(show_id, count = episodes.len(), "episodes loaded");
                        // A fresh list always opens unfiltered.
                        self.selection.set_term(String::new());
                        Load::Ready(episodes)
                    }
                    Err(err) => {
                        warn!(show_id, error = %err, "episodes failed to load");
                        Load::Failed(err)
                    }
                };
                true
            }
        }
    }

    /// Snapshot for the render boundary.
    pub fn render_view(&self) -> RenderView<'_> {
        match self.view {
            View::Shows => {
                let items = self.visible_shows();
                let status = self.shows.status(items.len());
                RenderView::Shows {
                    total: self.all_shows().len(),
                    items,
                    term: &self.show_term,
                    status,
                }
            }
            View::Episodes => {
                let items = self.visible_episodes();
                let status = self.episodes.status(items.len());
                RenderView::Episodes {
                    show: self.selection.show_id().and_then(|id| self.show(id)),
                    all: self.all_episodes(),
                    items,
                    selection: self.selection.episode(),
                    term: self.selection.term(),
                    status,
                }
            }
        }
    }
}
