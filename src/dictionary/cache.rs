//! Load-once dictionary cache.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use super::{Dictionary, DictionarySource};
use crate::error::{Error, LoadError, Result};

/// Outcome of one load attempt, cloned out to every caller awaiting it.
type Loaded = std::result::Result<Arc<Dictionary>, LoadFailure>;

type InFlight = Shared<BoxFuture<'static, Loaded>>;

#[derive(Debug, Clone)]
enum LoadFailure {
    Unavailable(Arc<LoadError>),
    Invalid(String),
}

impl From<LoadFailure> for Error {
    fn from(failure: LoadFailure) -> Self {
        match failure {
            LoadFailure::Unavailable(e) => Error::DictionaryUnavailable(e),
            LoadFailure::Invalid(msg) => Error::InvalidDictionary(msg),
        }
    }
}

enum Slot {
    Empty,
    Loading(InFlight),
    Ready(Arc<Dictionary>),
}

/// Lazily loads a [`Dictionary`] from a source on first use.
///
/// The first caller starts the load and concurrent callers await that same
/// load, whether it succeeds or fails. A completed dictionary is shared
/// read-only from then on. A failed load empties the slot, so the next call
/// fetches again.
pub struct DictionaryCache<S> {
    source: Arc<S>,
    slot: Mutex<Slot>,
}

impl<S: DictionarySource + 'static> DictionaryCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// The loaded dictionary, loading it if necessary.
    pub async fn get(&self) -> Result<Arc<Dictionary>> {
        let attempt = {
            let mut slot = self.slot();
            match &*slot {
                Slot::Ready(dictionary) => return Ok(Arc::clone(dictionary)),
                Slot::Loading(attempt) => attempt.clone(),
                Slot::Empty => {
                    let attempt = self.start_load();
                    *slot = Slot::Loading(attempt.clone());
                    attempt
                }
            }
        };

        let outcome = attempt.clone().await;

        // Settle only the attempt we awaited; a retry may already be running
        let mut slot = self.slot();
        if let Slot::Loading(current) = &*slot {
            if current.ptr_eq(&attempt) {
                *slot = match &outcome {
                    Ok(dictionary) => Slot::Ready(Arc::clone(dictionary)),
                    Err(_) => Slot::Empty,
                };
            }
        }

        outcome.map_err(Error::from)
    }

    /// The dictionary if a load has already completed.
    pub fn loaded(&self) -> Option<Arc<Dictionary>> {
        match &*self.slot() {
            Slot::Ready(dictionary) => Some(Arc::clone(dictionary)),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&*self.slot(), Slot::Ready(_))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // The slot is never left half-written, so a poisoned lock is still usable
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_load(&self) -> InFlight {
        let source = Arc::clone(&self.source);
        async move { load(&*source).await }.boxed().shared()
    }
}

async fn load<S: DictionarySource>(source: &S) -> Loaded {
    let origin = source.describe();
    info!("Loading dictionary from {}", origin);

    let data = source.load().await.map_err(|e| {
        warn!("Dictionary load from {} failed, will retry on next call: {}", origin, e);
        LoadFailure::Unavailable(Arc::new(e))
    })?;

    let dictionary = Dictionary::build(data).map_err(|e| {
        warn!("Dictionary from {} rejected: {}", origin, e);
        match e {
            Error::InvalidDictionary(msg) => LoadFailure::Invalid(msg),
            other => LoadFailure::Invalid(other.to_string()),
        }
    })?;

    Ok(Arc::new(dictionary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DictionaryData, PrefectureData};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails the first `failures` loads, then succeeds.
    struct FlakySource {
        calls: AtomicUsize,
        failures: usize,
    }

    impl FlakySource {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
            }
        }
    }

    impl DictionarySource for FlakySource {
        async fn load(&self) -> std::result::Result<DictionaryData, LoadError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if call < self.failures {
                return Err(LoadError::Status(503));
            }
            Ok(DictionaryData {
                generated_at: None,
                prefectures: vec![PrefectureData::new("13", "東京都")],
            })
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let cache = DictionaryCache::new(FlakySource::new(0));

        let results = futures::future::join_all((0..8).map(|_| cache.get())).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
        let first = results[0].as_ref().unwrap();
        assert!(results
            .iter()
            .all(|r| Arc::ptr_eq(first, r.as_ref().unwrap())));
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let cache = DictionaryCache::new(FlakySource::new(1));

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err.load_error(), Some(LoadError::Status(503))));
        assert!(!cache.is_loaded());

        let dictionary = cache.get().await.unwrap();
        assert_eq!(dictionary.prefectures().count(), 1);
        assert!(cache.is_loaded());
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 2);

        // Cached from now on
        cache.get().await.unwrap();
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_failure() {
        let cache = DictionaryCache::new(FlakySource::new(usize::MAX));

        let results = futures::future::join_all((0..8).map(|_| cache.get())).await;

        assert!(results
            .iter()
            .all(|r| matches!(r, Err(Error::DictionaryUnavailable(_)))));
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_loaded());

        // The failure is not cached
        assert!(cache.get().await.is_err());
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_data_is_not_cached() {
        struct BadSource;
        impl DictionarySource for BadSource {
            async fn load(&self) -> std::result::Result<DictionaryData, LoadError> {
                Ok(DictionaryData {
                    generated_at: None,
                    prefectures: vec![PrefectureData::new("13", "東京")],
                })
            }
            fn describe(&self) -> String {
                "bad".to_string()
            }
        }

        let cache = DictionaryCache::new(BadSource);
        assert!(matches!(
            cache.get().await,
            Err(Error::InvalidDictionary(_))
        ));
        assert!(cache.loaded().is_none());
    }
}
