use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::debug;

use super::error::CatalogUnavailable;

type Pending<V> = Shared<BoxFuture<'static, Result<Arc<V>, CatalogUnavailable>>>;

struct FlightState<K, V> {
    ready: HashMap<K, Arc<V>>,
    pending: HashMap<K, Pending<V>>,
}

/// Keyed cache where each key is fetched at most once at a time. Callers that
/// arrive while a fetch is running share its result. Successes stay cached
/// for the life of the value; failures are handed to the waiters and then
/// forgotten so the next call goes back to the source.
pub(crate) struct SingleFlight<K, V> {
    state: Mutex<FlightState<K, V>>,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FlightState {
                ready: HashMap::new(),
                pending: HashMap::new(),
            }),
        }
    }

    pub(crate) async fn get_or_fetch<F, Fut>(
        &self,
        key: K,
        fetch: F,
    ) -> Result<Arc<V>, CatalogUnavailable>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CatalogUnavailable>> + Send + 'static,
    {
        let pending = {
            let mut state = self.state.lock().await;
            if let Some(ready) = state.ready.get(&key) {
                debug!(?key, "served from cache");
                return Ok(Arc::clone(ready));
            }
            match state.pending.get(&key) {
                Some(pending) => {
                    debug!(?key, "joining in-flight fetch");
                    pending.clone()
                }
                None => {
                    let pending = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                    state.pending.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut state = self.state.lock().await;
        // A retry may already have registered a newer fetch under this key.
        if state
            .pending
            .get(&key)
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            state.pending.remove(&key);
        }
        if let Ok(value) = &result {
            state
                .ready
                .entry(key)
                .or_insert_with(|| Arc::clone(value));
        }
        result
    }

    pub(crate) async fn cached(&self, key: &K) -> Option<Arc<V>> {
        self.state.lock().await.ready.get(key).cloned()
    }

    pub(crate) async fn in_flight(&self, key: &K) -> bool {
        self.state.lock().await.pending.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let flight: SingleFlight<i64, Vec<u32>> = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let fetch = || {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Ok::<_, CatalogUnavailable>(vec![1, 2, 3])
            }
        };

        let (first, second, ()) = tokio::join!(
            flight.get_or_fetch(82, fetch()),
            flight.get_or_fetch(82, fetch()),
            async {
                tokio::task::yield_now().await;
                gate.notify_one();
            }
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = first.unwrap();
        let second = second.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!flight.in_flight(&82).await);
        assert_eq!(flight.cached(&82).await.as_deref(), Some(&vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let flight: SingleFlight<(), String> = SingleFlight::new();
        let calls = AtomicUsize::new(0);

        let err = flight
            .get_or_fetch((), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<String, _>(CatalogUnavailable::new("HTTP 500")) }
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason, "HTTP 500");
        assert!(flight.cached(&()).await.is_none());
        assert!(!flight.in_flight(&()).await);

        let value = flight
            .get_or_fetch((), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, CatalogUnavailable>("shows".to_string()) }
            })
            .await
            .unwrap();
        assert_eq!(value.as_str(), "shows");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cached_value_skips_the_fetch() {
        let flight: SingleFlight<i64, u8> = SingleFlight::new();
        let calls = AtomicUsize::new(0);
        let fetch = |value: u8| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, CatalogUnavailable>(value) }
        };

        flight.get_or_fetch(1, || fetch(5)).await.unwrap();
        let again = flight.get_or_fetch(1, || fetch(9)).await.unwrap();

        assert_eq!(*again, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
