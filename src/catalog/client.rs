use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Episode, Show, ShowId};

use super::error::CatalogUnavailable;
use super::single_flight::SingleFlight;

/// Where show and episode lists come from. The production source is
/// [`HttpCatalog`](super::HttpCatalog); tests script their own.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn shows(&self) -> Result<Vec<Show>, CatalogUnavailable>;
    async fn episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogUnavailable>;
}

/// Caching front for a [`CatalogSource`]. The show list is fetched once,
/// episode lists once per show, and concurrent requests for the same
/// resource share a single round-trip.
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
    shows: SingleFlight<(), Vec<Show>>,
    episodes: SingleFlight<ShowId, Vec<Episode>>,
}

impl CatalogClient {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            shows: SingleFlight::new(),
            episodes: SingleFlight::new(),
        }
    }

    pub async fn fetch_shows_once(&self) -> Result<Arc<Vec<Show>>, CatalogUnavailable> {
        let source = Arc::clone(&self.source);
        self.shows
            .get_or_fetch((), move || async move { source.shows().await })
            .await
    }

    pub async fn fetch_episodes_once(
        &self,
        show_id: ShowId,
    ) -> Result<Arc<Vec<Episode>>, CatalogUnavailable> {
        let source = Arc::clone(&self.source);
        self.episodes
            .get_or_fetch(show_id, move || async move { source.episodes(show_id).await })
            .await
    }

    /// Episode list for `show_id` if it has already been fetched.
    pub async fn cached_episodes(&self, show_id: ShowId) -> Option<Arc<Vec<Episode>>> {
        self.episodes.cached(&show_id).await
    }

    pub async fn episodes_in_flight(&self, show_id: ShowId) -> bool {
        self.episodes.in_flight(&show_id).await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::ScriptedSource;
    use super::*;
    use crate::models::fixtures::{episode, show};

    fn client_for(source: &Arc<ScriptedSource>) -> CatalogClient {
        let source: Arc<dyn CatalogSource> = Arc::clone(source) as Arc<dyn CatalogSource>;
        CatalogClient::new(source)
    }

    #[tokio::test]
    async fn show_list_is_fetched_once() {
        let source = Arc::new(ScriptedSource::new(vec![show(1, "Alpha"), show(2, "Beta")]));
        let client = client_for(&source);

        let first = client.fetch_shows_once().await.unwrap();
        let second = client.fetch_shows_once().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.show_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_episode_requests_hit_the_network_once() {
        let source = Arc::new(
            ScriptedSource::new(vec![show(82, "Thrones")])
                .with_episodes(82, vec![episode(1, 1, 1, "Winter", "")]),
        );
        let gate = source.gate_episodes(82);
        let client = client_for(&source);

        let (first, second, ()) = tokio::join!(
            client.fetch_episodes_once(82),
            client.fetch_episodes_once(82),
            async {
                tokio::task::yield_now().await;
                assert!(client.episodes_in_flight(82).await);
                gate.notify_one();
            }
        );

        assert_eq!(source.episode_calls(82), 1);
        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(second.unwrap().len(), 1);
        assert!(client.cached_episodes(82).await.is_some());
    }

    #[tokio::test]
    async fn failed_episode_fetch_is_retried_on_next_call() {
        let source = Arc::new(
            ScriptedSource::new(vec![show(82, "Thrones")])
                .with_episodes(82, vec![episode(1, 1, 1, "Winter", "")]),
        );
        source.fail_episodes(82, 1);
        let client = client_for(&source);

        let err = client.fetch_episodes_once(82).await.unwrap_err();
        assert!(err.reason.contains("500"));
        assert!(client.cached_episodes(82).await.is_none());
        assert!(!client.episodes_in_flight(82).await);

        let episodes = client.fetch_episodes_once(82).await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(source.episode_calls(82), 2);

        client.fetch_episodes_once(82).await.unwrap();
        assert_eq!(source.episode_calls(82), 2);
    }
}
