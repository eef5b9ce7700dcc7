//! What the user has narrowed the episode view down to: which show is open,
//! whether a single episode is picked, and the episode search term.

use crate::filter::filter_episodes;
use crate::models::{Episode, EpisodeId, ShowId};

/// Value of the episode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeSelection {
    #[default]
    All,
    Episode(EpisodeId),
}

#[derive(Debug, Default)]
pub struct SelectionRegistry {
    show_id: Option<ShowId>,
    episode: EpisodeSelection,
    term: String,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a show. Episode narrowing and the episode term start over; the
    /// caller is responsible for fetching the episode list.
    pub fn select_show(&mut self, id: ShowId) {
        self.show_id = Some(id);
        self.episode = EpisodeSelection::All;
        self.term.clear();
    }

    /// Pick one episode (or all). Ids missing from the loaded list are kept
    /// as-is and simply resolve to nothing.
    pub fn select_episode(&mut self, selection: EpisodeSelection) {
        self.episode = selection;
    }

    /// Replace the episode search term. A new term always drops back to
    /// showing all matches.
    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.episode = EpisodeSelection::All;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn show_id(&self) -> Option<ShowId> {
        self.show_id
    }

    pub fn episode(&self) -> EpisodeSelection {
        self.episode
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Visible episodes under the current term and selection.
    pub fn visible<'a>(&self, all: &'a [Episode]) -> Vec<&'a Episode> {
        resolve_visible_episodes(all, &self.term, self.episode)
    }
}

/// Apply the search term, then the single-episode selection, to a loaded
/// list. Both must match for an episode to be visible.
pub fn resolve_visible_episodes<'a>(
    all: &'a [Episode],
    term: &str,
    selection: EpisodeSelection,
) -> Vec<&'a Episode> {
    let filtered = filter_episodes(all, term);
    match selection {
        EpisodeSelection::All => filtered,
        EpisodeSelection::Episode(id) => filtered.into_iter().filter(|e| e.id == id).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::episode;

    fn ids(episodes: &[&Episode]) -> Vec<i64> {
        episodes.iter().map(|e| e.id).collect()
    }

    #[test]
    fn selecting_a_show_resets_episode_state() {
        let mut registry = SelectionRegistry::new();
        registry.select_show(7);
        registry.set_term("pilot");
        registry.select_episode(EpisodeSelection::Episode(3));

        registry.select_show(82);
        assert_eq!(registry.show_id(), Some(82));
        assert_eq!(registry.episode(), EpisodeSelection::All);
        assert_eq!(registry.term(), "");
    }

    #[test]
    fn all_or_one_episode_after_show_load() {
        let e1 = episode(1, 1, 1, "Pilot", "intro");
        let e2 = episode(2, 1, 2, "Part Two", "continues");
        let loaded = vec![e1.clone(), e2];

        let mut registry = SelectionRegistry::new();
        registry.select_show(82);
        assert_eq!(ids(&registry.visible(&loaded)), vec![1, 2]);

        registry.select_episode(EpisodeSelection::Episode(e1.id));
        assert_eq!(ids(&registry.visible(&loaded)), vec![1]);
    }

    #[test]
    fn unknown_episode_resolves_to_nothing() {
        let loaded = vec![episode(1, 1, 1, "Pilot", "intro")];
        let visible = resolve_visible_episodes(&loaded, "", EpisodeSelection::Episode(99));
        assert!(visible.is_empty());
    }

    #[test]
    fn term_and_selection_must_both_match() {
        let loaded = vec![
            episode(10, 1, 1, "Pilot", "intro"),
            episode(11, 1, 2, "Part Two", "continues"),
        ];
        let outside = resolve_visible_episodes(&loaded, "two", EpisodeSelection::Episode(10));
        assert!(outside.is_empty());

        let inside = resolve_visible_episodes(&loaded, "two", EpisodeSelection::Episode(11));
        assert_eq!(ids(&inside), vec![11]);
    }

    #[test]
    fn new_term_drops_single_episode_selection() {
        let mut registry = SelectionRegistry::new();
        registry.select_show(1);
        registry.select_episode(EpisodeSelection::Episode(10));
        registry.set_term("two");
        assert_eq!(registry.episode(), EpisodeSelection::All);
        assert_eq!(registry.term(), "two");
    }
}
