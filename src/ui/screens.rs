use crate::models::Episode;
use crate::selection::EpisodeSelection;

/// Highlighted row of a scrolling card list. The list itself lives in the
/// controller; the cursor only needs its length.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let len = len as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Entries shown in the episode selector.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PickerItem {
    All,
    Episode { id: i64, label: String },
}

impl PickerItem {
    pub(crate) fn label(&self) -> &str {
        match self {
            PickerItem::All => "All episodes",
            PickerItem::Episode { label, .. } => label,
        }
    }

    pub(crate) fn selection(&self) -> EpisodeSelection {
        match self {
            PickerItem::All => EpisodeSelection::All,
            PickerItem::Episode { id, .. } => EpisodeSelection::Episode(*id),
        }
    }
}

/// Backing state for the episode selector popup. It always lists the full
/// loaded season run, independent of the search term.
pub(crate) struct EpisodePicker {
    pub(crate) items: Vec<PickerItem>,
    pub(crate) cursor: ListCursor,
}

impl EpisodePicker {
    pub(crate) fn new(episodes: &[Episode], current: EpisodeSelection) -> Self {
        let mut items = vec![PickerItem::All];
        items.extend(episodes.iter().map(|episode| PickerItem::Episode {
            id: episode.id,
            label: episode.display_title(),
        }));

        let selected = items
            .iter()
            .position(|item| item.selection() == current)
            .unwrap_or(0);

        Self {
            items,
            cursor: ListCursor { selected },
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn current_item(&self) -> Option<&PickerItem> {
        self.items.get(self.cursor.selected)
    }
}
