//! Domain models for the catalog. Both types are plain data holders built
//! from a successful catalog response and never mutated afterwards; the rest
//! of the crate shares them behind `Arc<Vec<_>>` and filters by reference.

use std::fmt;

/// Catalog identifier of a show.
pub type ShowId = i64;
/// Catalog identifier of an episode, unique within its show.
pub type EpisodeId = i64;

#[derive(Debug, Clone, PartialEq)]
/// A television series as listed by the catalog.
pub struct Show {
    pub id: ShowId,
    pub name: String,
    /// Catalog summary. May contain HTML markup; it is kept verbatim and only
    /// stripped at draw time.
    pub summary: String,
    pub genres: Vec<String>,
    /// Production status such as `Running` or `Ended`.
    pub status: String,
    pub rating: Option<f64>,
    /// Typical episode runtime in minutes.
    pub runtime: Option<u32>,
    pub image_url: Option<String>,
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Show {
    /// Genres joined for display.
    pub fn genre_line(&self) -> String {
        self.genres.join(", ")
    }

    /// Genres joined with a bare comma, the form search runs against.
    pub fn genre_key(&self) -> String {
        self.genres.join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A single episode of one show. The owning show is not referenced here; the
/// catalog client keys episode lists by show id instead.
pub struct Episode {
    pub id: EpisodeId,
    pub season: u32,
    /// Episode number within the season. Specials without a number carry 0.
    pub number: u32,
    pub name: String,
    pub summary: String,
    pub airdate: Option<String>,
    pub runtime: Option<u32>,
    /// Catalog page for the episode, opened in the browser on demand.
    pub url: String,
    pub image_url: Option<String>,
}

impl Episode {
    /// Season/number code in the conventional `S01E02` form.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.number)
    }

    /// `S01E02 - Name`, used by the episode selector.
    pub fn display_title(&self) -> String {
        if self.name.trim().is_empty() {
            self.code()
        } else {
            format!("{} - {}", self.code(), self.name)
        }
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Episode, Show};

    pub(crate) fn show(id: i64, name: &str) -> Show {
        Show {
            id,
            name: name.to_string(),
            summary: String::new(),
            genres: Vec::new(),
            status: "Running".to_string(),
            rating: None,
            runtime: None,
            image_url: None,
        }
    }

    pub(crate) fn episode(id: i64, season: u32, number: u32, name: &str, summary: &str) -> Episode {
        Episode {
            id,
            season,
            number,
            name: name.to_string(),
            summary: summary.to_string(),
            airdate: None,
            runtime: None,
            url: format!("https://example.test/episodes/{id}"),
            image_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{episode, show};

    #[test]
    fn episode_code_pads_season_and_number() {
        let ep = episode(11, 1, 2, "Part Two", "continues");
        assert_eq!(ep.code(), "S01E02");
        assert_eq!(ep.display_title(), "S01E02 - Part Two");

        let late = episode(12, 12, 104, "", "");
        assert_eq!(late.code(), "S12E104");
        assert_eq!(late.display_title(), "S12E104");
    }

    #[test]
    fn show_genres_join_in_order() {
        let mut s = show(1, "Alpha");
        s.genres = vec!["Drama".into(), "Crime".into()];
        assert_eq!(s.genre_line(), "Drama, Crime");
        assert_eq!(s.genre_key(), "Drama,Crime");
        assert_eq!(s.to_string(), "Alpha");
    }
}
