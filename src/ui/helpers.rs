use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::filter::strip_markup;
use crate::models::{Episode, Show};

/// Cut `text` to at most `width` characters, marking the cut with an
/// ellipsis.
pub(crate) fn truncate_chars(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// One-line plain text rendering of a catalog summary.
pub(crate) fn summary_line(summary: &str, width: usize) -> String {
    let plain = strip_markup(summary);
    if plain.is_empty() {
        return "No summary available.".to_string();
    }
    truncate_chars(&plain, width)
}

/// `Drama, Crime • Ended • ★ 8.9 • 60 min`, skipping whatever is missing.
pub(crate) fn show_meta_line(show: &Show) -> String {
    let mut parts = Vec::new();
    if !show.genres.is_empty() {
        parts.push(show.genre_line());
    }
    if !show.status.trim().is_empty() {
        parts.push(show.status.trim().to_string());
    }
    if let Some(rating) = show.rating {
        parts.push(format!("★ {rating:.1}"));
    }
    if let Some(runtime) = show.runtime {
        parts.push(format!("{runtime} min"));
    }
    parts.join(" • ")
}

/// `Aired 2011-04-17 • 60 min`, or a placeholder when neither is known.
pub(crate) fn episode_meta_line(episode: &Episode) -> String {
    let mut parts = Vec::new();
    if let Some(airdate) = &episode.airdate {
        parts.push(format!("Aired {airdate}"));
    }
    if let Some(runtime) = episode.runtime {
        parts.push(format!("{runtime} min"));
    }
    if parts.is_empty() {
        "Air date unknown".to_string()
    } else {
        parts.join(" • ")
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for the episode selector popup.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::models::fixtures::{episode, show};

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(truncate_chars("Winter is Coming", 6), "Winte…");
        assert_eq!(truncate_chars("Pilot", 10), "Pilot");
        assert_eq!(truncate_chars("Pilot", 0), "");
    }

    #[test]
    fn meta_lines_skip_missing_fields() {
        let mut s = show(1, "Alpha");
        s.genres = vec!["Drama".into()];
        s.rating = Some(8.94);
        assert_eq!(show_meta_line(&s), "Drama • Running • ★ 8.9");

        let mut ep = episode(1, 1, 1, "Pilot", "");
        assert_eq!(episode_meta_line(&ep), "Air date unknown");
        ep.airdate = Some("2011-04-17".into());
        ep.runtime = Some(60);
        assert_eq!(episode_meta_line(&ep), "Aired 2011-04-17 • 60 min");
    }

    #[test]
    fn surfaces_innermost_cause() {
        let err = anyhow!("connection refused").context("failed to open link");
        assert_eq!(surface_error(&err), "connection refused");
    }

    #[test]
    fn blank_summary_gets_placeholder() {
        assert_eq!(summary_line("<p></p>", 40), "No summary available.");
    }
}
