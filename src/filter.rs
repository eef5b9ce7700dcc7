//! Client-side search over fetched lists. Every function here is pure: the
//! input slice is never touched, matches come back as borrowed references in
//! input order.

use crate::models::{Episode, Show};

/// Normalize a raw search box value. `None` means "no narrowing"; any other
/// input, whitespace included, is matched literally.
fn normalized_term(term: &str) -> Option<String> {
    if term.is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Shows whose name, summary or genre list contains `term`, ignoring case.
pub fn filter_shows<'a>(shows: &'a [Show], term: &str) -> Vec<&'a Show> {
    let Some(needle) = normalized_term(term) else {
        return shows.iter().collect();
    };

    shows
        .iter()
        .filter(|show| {
            contains_folded(&show.name, &needle)
                || contains_folded(&show.summary, &needle)
                || contains_folded(&show.genre_key(), &needle)
        })
        .collect()
}

/// Episodes whose name or summary contains `term`, ignoring case.
pub fn filter_episodes<'a>(episodes: &'a [Episode], term: &str) -> Vec<&'a Episode> {
    let Some(needle) = normalized_term(term) else {
        return episodes.iter().collect();
    };

    episodes
        .iter()
        .filter(|episode| {
            contains_folded(&episode.name, &needle) || contains_folded(&episode.summary, &needle)
        })
        .collect()
}

/// Drop HTML tags from a catalog summary and collapse the whitespace left
/// behind, so it fits on a terminal line.
pub fn strip_markup(summary: &str) -> String {
    let mut text = String::with_capacity(summary.len());
    let mut in_tag = false;
    for ch in summary.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let text = text
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{episode, show};

    fn pilot_pair() -> Vec<Episode> {
        vec![
            episode(10, 1, 1, "Pilot", "intro"),
            episode(11, 1, 2, "Part Two", "continues"),
        ]
    }

    #[test]
    fn show_search_matches_name_prefix() {
        let shows = vec![show(1, "Alpha"), show(2, "Beta")];
        let ids: Vec<i64> = filter_shows(&shows, "alp").iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn show_search_looks_at_summary_and_genres() {
        let mut noir = show(1, "Alpha");
        noir.genres = vec!["Crime".into(), "Thriller".into()];
        let mut quiet = show(2, "Beta");
        quiet.summary = "<p>A <b>quiet</b> village drama</p>".into();
        let shows = vec![noir, quiet, show(3, "Gamma")];

        let genre: Vec<i64> = filter_shows(&shows, "THRILL").iter().map(|s| s.id).collect();
        assert_eq!(genre, vec![1]);

        let summary: Vec<i64> = filter_shows(&shows, "village").iter().map(|s| s.id).collect();
        assert_eq!(summary, vec![2]);
    }

    #[test]
    fn empty_term_keeps_every_item_in_order() {
        let episodes = pilot_pair();
        assert_eq!(filter_episodes(&episodes, ""), episodes.iter().collect::<Vec<_>>());

        let shows = vec![show(2, "Beta"), show(1, "Alpha")];
        let ids: Vec<i64> = filter_shows(&shows, "").iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn episode_search_is_case_insensitive() {
        let episodes = pilot_pair();
        let ids: Vec<i64> = filter_episodes(&episodes, "two").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![11]);

        let ids: Vec<i64> = filter_episodes(&episodes, "INTRO").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn episode_search_returns_ordered_subsequence() {
        let episodes = vec![
            episode(1, 1, 1, "The Door", "a door opens"),
            episode(2, 1, 2, "Window", "nothing here"),
            episode(3, 1, 3, "Another", "the DOOR closes"),
            episode(4, 1, 4, "", ""),
        ];
        let hits = filter_episodes(&episodes, "door");
        let ids: Vec<i64> = hits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        for hit in hits {
            let haystack = format!("{} {}", hit.name, hit.summary).to_lowercase();
            assert!(haystack.contains("door"));
        }
    }

    #[test]
    fn whitespace_term_is_matched_literally() {
        let episodes = pilot_pair();
        let hits = filter_episodes(&episodes, " ");
        let ids: Vec<i64> = hits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![11]);
        for hit in hits {
            assert!(hit.name.contains(' ') || hit.summary.contains(' '));
        }

        let shows = vec![show(1, "Alpha"), show(2, "Breaking Bad")];
        let ids: Vec<i64> = filter_shows(&shows, " ").iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn genre_search_spans_adjacent_genres() {
        let mut noir = show(1, "Alpha");
        noir.genres = vec!["Drama".into(), "Crime".into()];
        let shows = vec![noir];

        assert_eq!(filter_shows(&shows, "drama,crime").len(), 1);
        assert!(filter_shows(&shows, "drama, crime").is_empty());
    }

    #[test]
    fn markup_is_removed_for_display() {
        assert_eq!(
            strip_markup("<p>Two <b>friends</b> &amp; a\n dog.</p>"),
            "Two friends & a dog."
        );
        assert_eq!(strip_markup(""), "");
    }
}
