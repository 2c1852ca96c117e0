//! Client-side controller keeping a local collection consistent with a remote endpoint.
//!
//! The network is reached only through caller-supplied functions, so a
//! `ResourceSync` works against any transport and is trivially mockable.
//! State lives behind a lock that is never held across an await point:
//! several operations may be in flight at once, and their effects land in
//! completion order.

use serde_json::{Map, Value};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::{NetworkError, SyncError, ValidationError};
use crate::draft::{FormDraft, Payload};
use crate::resource::{Collection, Resource, ResourceId};

/// What `load_all` does when the fetch fails.
#[derive(Debug, Clone)]
pub enum SeedFallback<T> {
    /// Keep whatever the collection held before and report the failure.
    KeepPrevious,
    /// Replace the collection with these records and report the failure alongside.
    Seed(Vec<T>),
}

/// Result of a successful `load_all`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The server answered; the collection now holds `count` elements.
    Fetched { count: usize },
    /// The fetch failed and seed records were installed instead.
    Seeded { count: usize, error: NetworkError },
    /// The owner was unmounted before the response arrived; nothing changed.
    Discarded,
}

/// Local copy of one remote resource collection.
///
/// Cloning yields another handle to the same state.
pub struct ResourceSync<T> {
    label: String,
    state: Arc<Mutex<Collection<T>>>,
    mounted: Arc<AtomicBool>,
    fallback: SeedFallback<T>,
}

impl<T: Clone> Clone for ResourceSync<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            state: Arc::clone(&self.state),
            mounted: Arc::clone(&self.mounted),
            fallback: self.fallback.clone(),
        }
    }
}

impl<T: Resource> ResourceSync<T> {
    /// Creates an empty, mounted instance. `label` names it in logs.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: Arc::new(Mutex::new(Collection::new())),
            mounted: Arc::new(AtomicBool::new(true)),
            fallback: SeedFallback::KeepPrevious,
        }
    }

    pub fn with_fallback(mut self, fallback: SeedFallback<T>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Marks the owner as gone. Responses arriving afterwards are not applied.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Snapshot of the current collection.
    pub fn snapshot(&self) -> Collection<T> {
        self.lock().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items().to_vec()
    }

    pub fn ids(&self) -> Vec<ResourceId> {
        self.lock().ids()
    }

    pub fn get(&self, id: &ResourceId) -> Option<T> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Fetches the whole collection and replaces local state with it.
    ///
    /// A missing body loads as empty. On failure the previous collection is
    /// kept unless a seed fallback is configured. There is no retry.
    pub async fn load_all<F, Fut>(&self, fetch: F) -> Result<LoadOutcome, SyncError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Vec<T>>, NetworkError>>,
    {
        match fetch().await {
            Ok(body) => {
                let Some(count) = self.replace_all(body.unwrap_or_default()) else {
                    return Ok(LoadOutcome::Discarded);
                };
                tracing::debug!(resource = %self.label, count, "collection loaded");
                Ok(LoadOutcome::Fetched { count })
            }
            Err(error) => match &self.fallback {
                SeedFallback::KeepPrevious => {
                    tracing::warn!(resource = %self.label, error = %error, "load failed");
                    Err(error.into())
                }
                SeedFallback::Seed(seed) => {
                    let Some(count) = self.replace_all(seed.clone()) else {
                        return Ok(LoadOutcome::Discarded);
                    };
                    tracing::warn!(
                        resource = %self.label,
                        error = %error,
                        count,
                        "load failed, showing seed data"
                    );
                    Ok(LoadOutcome::Seeded { count, error })
                }
            },
        }
    }

    /// Validates and submits a draft, prepending the created resource.
    ///
    /// `submit` is never called if `validate` fails. On success the draft is
    /// reset to its initial shape; on failure it is left as it was so the
    /// user can retry.
    pub async fn create<V, S, Fut>(
        &self,
        draft: &mut FormDraft,
        validate: V,
        submit: S,
    ) -> Result<T, SyncError>
    where
        V: FnOnce(&FormDraft) -> Result<(), ValidationError>,
        S: FnOnce(Payload) -> Fut,
        Fut: Future<Output = Result<T, NetworkError>>,
    {
        validate(&*draft)?;
        let payload = draft.to_payload()?;

        let created = submit(payload).await.map_err(|error| {
            tracing::warn!(resource = %self.label, error = %error, "create failed");
            error
        })?;

        let applied = self.apply(|collection| collection.prepend(created.clone()));
        if applied {
            tracing::debug!(resource = %self.label, id = %created.id(), "created");
        }
        draft.reset();
        Ok(created)
    }

    /// Submits a partial update and replaces the matching element with the response.
    ///
    /// If no element with `id` is held locally (for example after a reload
    /// raced the update) the response is returned and the collection is left alone.
    pub async fn update<S, Fut>(
        &self,
        id: ResourceId,
        patch: Map<String, Value>,
        submit: S,
    ) -> Result<T, SyncError>
    where
        S: FnOnce(ResourceId, Map<String, Value>) -> Fut,
        Fut: Future<Output = Result<T, NetworkError>>,
    {
        let updated = submit(id.clone(), patch).await.map_err(|error| {
            tracing::warn!(resource = %self.label, %id, error = %error, "update failed");
            error
        })?;

        self.apply(|collection| {
            if collection.replace(&id, updated.clone()) {
                tracing::debug!(resource = %self.label, %id, "updated");
            } else {
                tracing::debug!(resource = %self.label, %id, "update target no longer held");
            }
        });
        Ok(updated)
    }

    /// Replaces the whole collection. Returns the new length, or `None` if unmounted.
    pub(crate) fn replace_all(&self, items: Vec<T>) -> Option<usize> {
        let mut count = 0;
        let applied = self.apply(|collection| {
            *collection = Collection::from_items(items);
            count = collection.len();
        });
        applied.then_some(count)
    }

    /// Runs `f` on the collection if the owner is still mounted.
    fn apply(&self, f: impl FnOnce(&mut Collection<T>)) -> bool {
        if !self.is_mounted() {
            tracing::debug!(resource = %self.label, "unmounted, discarding response");
            return false;
        }
        f(&mut self.lock());
        true
    }

    fn lock(&self) -> MutexGuard<'_, Collection<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
