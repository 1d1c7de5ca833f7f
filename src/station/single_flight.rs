//! Coalesces concurrent cache misses into a single upstream fetch.
//!
//! The first caller to miss on a key starts the fetch on its own task and
//! registers it here. Callers that arrive while it runs await that same task
//! and receive a clone of its outcome, failures included. The task removes
//! its slot when it finishes, so the map only holds keys with a fetch in
//! progress. A caller that goes away does not cancel the fetch.

use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::ApiError;

type Flight<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;

pub struct InFlight<T> {
    flights: Arc<DashMap<String, Flight<T>>>,
}

impl<T> Clone for InFlight<T> {
    fn clone(&self) -> Self {
        Self {
            flights: self.flights.clone(),
        }
    }
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self {
            flights: Arc::new(DashMap::new()),
        }
    }
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the fetch running for `key`, or spawns `fetch` if there is none.
    pub async fn run<F>(&self, key: &str, fetch: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let flight = match self.flights.entry(key.to_string()) {
            Entry::Occupied(slot) => slot.get().clone(),
            Entry::Vacant(slot) => {
                let release = SlotRelease {
                    flights: self.flights.clone(),
                    key: key.to_string(),
                };
                let task = tokio::spawn(async move {
                    let _release = release;
                    fetch.await
                });

                let flight = async move {
                    task.await.unwrap_or_else(|e| {
                        Err(ApiError::Internal(format!("fetch task failed: {e}")))
                    })
                }
                .boxed()
                .shared();
                slot.insert(flight.clone());
                flight
            }
        };

        flight.await
    }

    /// Number of keys with a fetch in progress.
    pub fn in_progress(&self) -> usize {
        self.flights.len()
    }
}

/// Frees a key's slot when its fetch task ends, panics included. The
/// removal waits on the map shard until the spawning caller has inserted it.
struct SlotRelease<T> {
    flights: Arc<DashMap<String, Flight<T>>>,
    key: String,
}

impl<T> Drop for SlotRelease<T> {
    fn drop(&mut self) {
        self.flights.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{Operation, UpstreamError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        outcome: Result<u32, ApiError>,
    ) -> impl Future<Output = Result<u32, ApiError>> + Send + 'static {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(10)).await;
            outcome
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_followers_share_the_leader_result() {
        let flights = InFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let flights = flights.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                flights
                    .run("playlists:1", counting_fetch(calls, Ok(7)))
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_progress(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_followers_share_the_leader_failure() {
        let flights = InFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = ApiError::Upstream(UpstreamError::HttpStatus {
            operation: Operation::Playlists,
            status: 503,
        });

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flights = flights.clone();
            let calls = calls.clone();
            let failure = failure.clone();
            handles.push(tokio::spawn(async move {
                flights
                    .run("playlists:1", counting_fetch(calls, Err(failure)))
                    .await
            }));
        }
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(matches!(
                err,
                ApiError::Upstream(UpstreamError::HttpStatus { status: 503, .. })
            ));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_progress(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_fetch_still_completes_and_frees_slot() {
        let flights = InFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            flights.run("now-playing:1", counting_fetch(calls.clone(), Ok(1))),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(flights.in_progress(), 1);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(flights.in_progress(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_keys_fetch_independently() {
        let flights = InFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            flights.run("now-playing:1", counting_fetch(calls.clone(), Ok(1))),
            flights.run("now-playing:2", counting_fetch(calls.clone(), Ok(2))),
        );

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
