//! JSON shapes returned by the catalog, limited to the fields we consume.
//! Every optional or nullable field defaults so a sparse record still
//! decodes.

use serde::Deserialize;

use crate::models::{Episode, Show};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireImage {
    medium: Option<String>,
    original: Option<String>,
}

impl WireImage {
    fn best(self) -> Option<String> {
        self.medium.or(self.original)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRating {
    average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireShow {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    rating: Option<WireRating>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    image: Option<WireImage>,
}

impl From<WireShow> for Show {
    fn from(wire: WireShow) -> Self {
        Show {
            id: wire.id,
            name: wire.name.unwrap_or_default(),
            summary: wire.summary.unwrap_or_default(),
            genres: wire.genres.unwrap_or_default(),
            status: wire.status.unwrap_or_default(),
            rating: wire.rating.and_then(|r| r.average),
            runtime: wire.runtime,
            image_url: wire.image.and_then(WireImage::best),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEpisode {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    season: Option<u32>,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    airdate: Option<String>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<WireImage>,
}

impl From<WireEpisode> for Episode {
    fn from(wire: WireEpisode) -> Self {
        Episode {
            id: wire.id,
            season: wire.season.unwrap_or(1),
            number: wire.number.unwrap_or(0),
            name: wire.name.unwrap_or_default(),
            summary: wire.summary.unwrap_or_default(),
            // The catalog reports unknown air dates as an empty string.
            airdate: wire.airdate.filter(|date| !date.trim().is_empty()),
            runtime: wire.runtime,
            url: wire.url.unwrap_or_default(),
            image_url: wire.image.and_then(WireImage::best),
        }
    }
}
