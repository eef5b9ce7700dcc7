use std::cmp::min;
use std::mem;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::catalog::CatalogClient;
use crate::controller::{Effect, Fetched, Input, ListStatus, RenderView, View, ViewController};
use crate::models::{Episode, Show};
use crate::selection::EpisodeSelection;

use super::helpers::{
    centered_rect, episode_meta_line, show_meta_line, summary_line, surface_error,
};
use super::screens::{EpisodePicker, ListCursor};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header above each card list.
const HEADER_HEIGHT: u16 = 4;
/// Height allocation per show or episode card.
const CARD_HEIGHT: u16 = 5;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Fine-grained modes layered over the active view.
enum Mode {
    Normal,
    Searching(SearchState),
    PickingEpisode(EpisodePicker),
}

/// State for an active inline search. Every keystroke is pushed to the
/// controller, so the list filters live.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front-end around the [`ViewController`]. It translates keys into
/// controller inputs, runs fetch effects as background tasks and draws
/// whatever the controller says is visible.
pub struct App {
    controller: ViewController,
    catalog: Arc<CatalogClient>,
    fetched_tx: UnboundedSender<Fetched>,
    show_cursor: ListCursor,
    episode_cursor: ListCursor,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Arc<CatalogClient>, fetched_tx: UnboundedSender<Fetched>) -> Self {
        Self {
            controller: ViewController::new(),
            catalog,
            fetched_tx,
            show_cursor: ListCursor::default(),
            episode_cursor: ListCursor::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    /// Request the show list. Must be called from inside the runtime.
    pub fn start(&mut self) {
        let effect = self.controller.start();
        self.run_effect(effect);
    }

    /// Feed a finished fetch back into the controller.
    pub fn apply(&mut self, fetched: Fetched) {
        if self.controller.apply(fetched) {
            if let Mode::Searching(state) = &mut self.mode {
                state.query = self.controller.term().to_string();
            }
            self.sync_cursors();
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::PickingEpisode(picker) => self.handle_pick_episode(code, picker),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchState {
                    query: self.controller.term().to_string(),
                }));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                self.dispatch(Input::Retry);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Home => self.active_cursor().select_first(),
            KeyCode::End => {
                let len = self.visible_len();
                self.active_cursor().select_last(len);
            }
            _ => {}
        }

        match self.controller.view() {
            View::Shows => match code {
                KeyCode::Esc => *exit = true,
                KeyCode::Enter => {
                    if let Some(show) = self.current_show().cloned() {
                        self.clear_status();
                        self.open_show(show.id);
                    } else {
                        self.set_status("No show selected.", StatusKind::Error);
                    }
                }
                _ => {}
            },
            View::Episodes => match code {
                KeyCode::Esc | KeyCode::Backspace => {
                    self.clear_status();
                    self.dispatch(Input::Back);
                }
                KeyCode::Enter => self.open_current_episode(),
                KeyCode::Char('e') | KeyCode::Char('E') => {
                    let all = self.controller.all_episodes();
                    if all.is_empty() {
                        self.set_status("No episodes loaded.", StatusKind::Error);
                    } else {
                        let picker = EpisodePicker::new(all, self.controller.episode_selection());
                        return Ok(Mode::PickingEpisode(picker));
                    }
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    self.dispatch(Input::EpisodeSelected(EpisodeSelection::All));
                }
                KeyCode::Tab => {
                    self.clear_status();
                    self.open_relative_show(1);
                }
                KeyCode::BackTab => {
                    self.clear_status();
                    self.open_relative_show(-1);
                }
                _ => {}
            },
        }

        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.dispatch(Input::SearchChanged(String::new()));
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Backspace => {
                state.query.pop();
                self.dispatch(Input::SearchChanged(state.query.clone()));
            }
            KeyCode::Char(c) => {
                state.query.push(c);
                self.dispatch(Input::SearchChanged(state.query.clone()));
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            _ => {}
        }
        Mode::Searching(state)
    }

    fn handle_pick_episode(&mut self, code: KeyCode, mut picker: EpisodePicker) -> Mode {
        let len = picker.len();
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.cursor.move_selection(-1, len),
            KeyCode::Down => picker.cursor.move_selection(1, len),
            KeyCode::PageUp => picker.cursor.move_selection(-PAGE_STEP, len),
            KeyCode::PageDown => picker.cursor.move_selection(PAGE_STEP, len),
            KeyCode::Home => picker.cursor.select_first(),
            KeyCode::End => picker.cursor.select_last(len),
            KeyCode::Enter => {
                if let Some(item) = picker.current_item() {
                    self.dispatch(Input::EpisodeSelected(item.selection()));
                    self.episode_cursor.select_first();
                }
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::PickingEpisode(picker)
    }

    /// Route one input through the controller and run whatever fetch it asks
    /// for.
    fn dispatch(&mut self, input: Input) {
        if let Some(effect) = self.controller.handle(input) {
            self.run_effect(effect);
        }
        self.sync_cursors();
    }

    fn run_effect(&self, effect: Effect) {
        let catalog = Arc::clone(&self.catalog);
        let tx = self.fetched_tx.clone();
        debug!(?effect, "running effect");
        tokio::spawn(async move {
            let fetched = match effect {
                Effect::FetchShows => Fetched::Shows(catalog.fetch_shows_once().await),
                Effect::FetchEpisodes(show_id) => Fetched::Episodes {
                    show_id,
                    result: catalog.fetch_episodes_once(show_id).await,
                },
            };
            // The receiver only goes away when the UI is shutting down.
            let _ = tx.send(fetched);
        });
    }

    fn open_show(&mut self, show_id: i64) {
        self.episode_cursor = ListCursor::default();
        self.dispatch(Input::ShowPicked(show_id));
    }

    /// Jump to the neighbouring show of the (filtered) show list without
    /// going back to it first.
    fn open_relative_show(&mut self, offset: isize) {
        let Some(current) = self.controller.selected_show_id() else {
            return;
        };
        let ids: Vec<i64> = self
            .controller
            .visible_shows()
            .iter()
            .map(|show| show.id)
            .collect();
        if ids.is_empty() {
            return;
        }
        let len = ids.len() as isize;
        let index = ids
            .iter()
            .position(|id| *id == current)
            .map(|idx| idx as isize)
            .unwrap_or(-1);
        let next = (index + offset).rem_euclid(len) as usize;
        self.show_cursor.selected = next;
        self.open_show(ids[next]);
    }

    fn open_current_episode(&mut self) {
        let Some(episode) = self.current_episode().cloned() else {
            self.set_status("No episode selected.", StatusKind::Error);
            return;
        };
        let url = episode.url.trim().to_string();
        if url.is_empty() {
            self.set_status("This episode does not have a link.", StatusKind::Error);
            return;
        }
        match open_link(&url).with_context(|| format!("failed to open {url}")) {
            Ok(()) => {
                info!(%url, "opened episode page");
                self.set_status(format!("Opened {}.", episode.code()), StatusKind::Info);
            }
            Err(err) => {
                self.set_status(
                    format!("Failed to open link: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    fn current_show(&self) -> Option<&Show> {
        self.controller
            .visible_shows()
            .get(self.show_cursor.selected)
            .copied()
    }

    fn current_episode(&self) -> Option<&Episode> {
        self.controller
            .visible_episodes()
            .get(self.episode_cursor.selected)
            .copied()
    }

    fn visible_len(&self) -> usize {
        match self.controller.view() {
            View::Shows => self.controller.visible_shows().len(),
            View::Episodes => self.controller.visible_episodes().len(),
        }
    }

    fn active_cursor(&mut self) -> &mut ListCursor {
        match self.controller.view() {
            View::Shows => &mut self.show_cursor,
            View::Episodes => &mut self.episode_cursor,
        }
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.visible_len();
        self.active_cursor().move_selection(offset, len);
    }

    fn sync_cursors(&mut self) {
        let shows = self.controller.visible_shows().len();
        self.show_cursor.ensure_in_bounds(shows);
        let episodes = self.controller.visible_episodes().len();
        self.episode_cursor.ensure_in_bounds(episodes);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match self.controller.render_view() {
            RenderView::Shows {
                items,
                total,
                term,
                status,
            } => self.draw_show_view(frame, content_area, &items, total, term, &status),
            RenderView::Episodes {
                show,
                items,
                all,
                selection,
                term,
                status,
            } => {
                let header = EpisodeHeader {
                    show,
                    shown: items.len(),
                    total: all.len(),
                    selection,
                    term,
                };
                self.draw_episode_view(frame, content_area, &header, &items, &status)
            }
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::PickingEpisode(picker) => self.draw_episode_picker(frame, area, picker),
            Mode::Normal => {}
        }
    }

    fn split_header(area: Rect) -> (Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
            .split(area);
        (chunks[0], chunks[1])
    }

    fn draw_show_view(
        &self,
        frame: &mut Frame,
        area: Rect,
        shows: &[&Show],
        total: usize,
        term: &str,
        status: &ListStatus,
    ) {
        let (header_area, list_area) = Self::split_header(area);

        let mut lines = vec![Line::from(Span::styled(
            format!("Displaying {}/{} shows", shows.len(), total),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if !term.trim().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Search: {term}"),
                Style::default().fg(Color::Gray),
            )));
        }
        let header = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title("TV Shows"));
        frame.render_widget(header, header_area);

        match status {
            ListStatus::Loading => self.draw_notice(frame, list_area, "Loading shows…", None),
            ListStatus::Failed(reason) => self.draw_notice(
                frame,
                list_area,
                &format!("Could not load shows: {reason}"),
                Some("Press 'r' to retry."),
            ),
            ListStatus::Empty => self.draw_notice(
                frame,
                list_area,
                &format!("No shows match \"{}\".", term.trim()),
                Some("Press '/' to change the search."),
            ),
            ListStatus::Ready => {
                let cards: Vec<Card> = shows.iter().map(|show| Card::for_show(show)).collect();
                self.render_cards(frame, list_area, &cards, self.show_cursor.selected);
            }
        }
    }

    fn draw_episode_view(
        &self,
        frame: &mut Frame,
        area: Rect,
        header: &EpisodeHeader<'_>,
        episodes: &[&Episode],
        status: &ListStatus,
    ) {
        let (header_area, list_area) = Self::split_header(area);

        let title = header
            .show
            .map(|show| show.name.clone())
            .unwrap_or_else(|| "Episodes".to_string());
        let mut detail = format!("Displaying {}/{} episodes", header.shown, header.total);
        if let EpisodeSelection::Episode(id) = header.selection {
            detail.push_str(&format!("  •  single episode #{id}"));
        }
        let mut lines = vec![Line::from(Span::styled(
            detail,
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if !header.term.trim().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Search: {}", header.term),
                Style::default().fg(Color::Gray),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, header_area);

        match status {
            ListStatus::Loading => self.draw_notice(frame, list_area, "Loading episodes…", None),
            ListStatus::Failed(reason) => self.draw_notice(
                frame,
                list_area,
                &format!("Could not load episodes: {reason}"),
                Some("Press 'r' to retry or Esc to go back."),
            ),
            ListStatus::Empty => self.draw_notice(
                frame,
                list_area,
                "No episodes match the current search and selection.",
                Some("Press 'a' to show all episodes or '/' to change the search."),
            ),
            ListStatus::Ready => {
                let cards: Vec<Card> = episodes
                    .iter()
                    .map(|episode| Card::for_episode(episode))
                    .collect();
                self.render_cards(frame, list_area, &cards, self.episode_cursor.selected);
            }
        }
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect, message: &str, hint: Option<&str>) {
        let style = if message.starts_with("Could not") {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let mut lines = vec![Line::from(Span::styled(message.to_string(), style))];
        if let Some(hint) = hint {
            lines.push(Line::from(Span::styled(
                hint.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, cards: &[Card], selected: usize) {
        if cards.is_empty() || area.height == 0 {
            return;
        }

        let card_height = CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = cards.len();
        let selected = min(selected, len - 1);
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }

            let card_index = start + idx;
            let Some(card) = cards.get(card_index) else {
                break;
            };

            let is_selected = card_index == selected;
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if is_selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let title = if is_selected {
                format!("▶ {}", card.title)
            } else {
                card.title.clone()
            };
            let inner_width = chunk.width.saturating_sub(2) as usize;
            let lines = vec![
                Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    card.meta.clone(),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::raw(summary_line(&card.summary, inner_width))),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from(Span::styled(
                "Data originally from TVMaze.com",
                Style::default().fg(Color::DarkGray),
            ))
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let title = match self.controller.view() {
            View::Shows => "Search shows",
            View::Episodes => "Search episodes",
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_episode_picker(&self, frame: &mut Frame, area: Rect, picker: &EpisodePicker) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Select Episode")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let current = self.controller.episode_selection();
        let items: Vec<ListItem> = picker
            .items
            .iter()
            .map(|item| {
                let marker = if item.selection() == current {
                    "(•)"
                } else {
                    "( )"
                };
                ListItem::new(format!("{marker} {}", item.label()))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.cursor.selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, self.controller.view()) {
            (Mode::Searching(_), _) => &[
                ("[Type]", " Filter   "),
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Keep   "),
                ("[Esc]", " Clear"),
            ],
            (Mode::PickingEpisode(_), _) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Select   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::Normal, View::Shows) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Episodes   "),
                ("[/]", " Search   "),
                ("[r]", " Retry   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, View::Episodes) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[/]", " Search   "),
                ("[e]", " Select   "),
                ("[a]", " All   "),
                ("[Tab]", " Next show   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }
}

/// Header facts for the episode view.
struct EpisodeHeader<'a> {
    show: Option<&'a Show>,
    shown: usize,
    total: usize,
    selection: EpisodeSelection,
    term: &'a str,
}

/// Text content of one list card, shared by shows and episodes.
struct Card {
    title: String,
    meta: String,
    summary: String,
}

impl Card {
    fn for_show(show: &Show) -> Self {
        Self {
            title: show.name.clone(),
            meta: show_meta_line(show),
            summary: show.summary.clone(),
        }
    }

    fn for_episode(episode: &Episode) -> Self {
        Self {
            title: format!("{} ({})", episode.name, episode.code()),
            meta: episode_meta_line(episode),
            summary: episode.summary.clone(),
        }
    }
}
