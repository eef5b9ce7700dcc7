use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{Episode, Show, ShowId};

use super::client::CatalogSource;
use super::error::CatalogUnavailable;
use super::wire::{WireEpisode, WireShow};

/// User agent sent with every catalog request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Catalog source backed by the public REST API.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    fn episodes_url(&self, show_id: ShowId) -> String {
        format!("{}/shows/{show_id}/episodes", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogUnavailable> {
        info!(%url, "requesting catalog resource");
        let response = self.client.get(url).send().await.map_err(|err| {
            warn!(%url, error = %err, "catalog request failed");
            CatalogUnavailable::from(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "catalog returned an error status");
            return Err(CatalogUnavailable::status(status));
        }

        response.json::<T>().await.map_err(|err| {
            warn!(%url, error = %err, "catalog body could not be decoded");
            CatalogUnavailable::from(err)
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn shows(&self) -> Result<Vec<Show>, CatalogUnavailable> {
        let wire: Vec<WireShow> = self.get_json(&self.shows_url()).await?;
        Ok(wire.into_iter().map(Show::from).collect())
    }

    async fn episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogUnavailable> {
        let wire: Vec<WireEpisode> = self.get_json(&self.episodes_url(show_id)).await?;
        Ok(wire.into_iter().map(Episode::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_resource_urls_from_base() {
        let catalog = HttpCatalog::new("https://catalog.test", Duration::from_secs(5)).unwrap();
        assert_eq!(catalog.shows_url(), "https://catalog.test/shows");
        assert_eq!(catalog.episodes_url(82), "https://catalog.test/shows/82/episodes");
    }

    #[tokio::test]
    async fn transport_failure_maps_to_catalog_unavailable() {
        // Not a valid URL, so reqwest fails before opening a connection.
        let catalog = HttpCatalog::new("http://bad host", Duration::from_secs(2)).unwrap();
        let err = catalog.shows().await.unwrap_err();
        assert!(!err.reason.is_empty());
    }
}
