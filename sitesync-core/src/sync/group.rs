//! All-or-nothing parallel loading of several collections.
//!
//! A command typically needs its main collection plus a few reference sets
//! before it can render anything. [`LoadGroup`] fetches them concurrently and
//! applies the results only once every fetch has succeeded, so a failure
//! never leaves a half-initialized command behind.

use futures::future::{self, FutureExt, LocalBoxFuture};
use std::future::Future;

use super::error::{NetworkError, SyncError};
use super::resource_sync::ResourceSync;
use crate::resource::Resource;

type Commit<'a> = Box<dyn FnOnce() + 'a>;

/// A set of staged loads, applied together or not at all.
///
/// Seed fallbacks configured on the member syncs are not consulted here.
#[derive(Default)]
pub struct LoadGroup<'a> {
    staged: Vec<LocalBoxFuture<'a, Result<Commit<'a>, NetworkError>>>,
    labels: Vec<String>,
}

impl<'a> LoadGroup<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a fetch whose result will replace `sync`'s collection.
    pub fn stage<T, F, Fut>(mut self, sync: &'a ResourceSync<T>, fetch: F) -> Self
    where
        T: Resource,
        F: FnOnce() -> Fut + 'a,
        Fut: Future<Output = Result<Option<Vec<T>>, NetworkError>> + 'a,
    {
        self.labels.push(sync.label().to_string());
        let staged = async move {
            let items = fetch().await?.unwrap_or_default();
            let commit: Commit<'a> = Box::new(move || {
                sync.replace_all(items);
            });
            Ok::<_, NetworkError>(commit)
        };
        self.staged.push(staged.boxed_local());
        self
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Runs every staged fetch concurrently.
    ///
    /// Fails as soon as any fetch fails, in which case no collection is touched.
    pub async fn run(self) -> Result<(), SyncError> {
        let labels = self.labels;
        let commits = future::try_join_all(self.staged).await.map_err(|error| {
            tracing::warn!(resources = ?labels, error = %error, "group load failed");
            error
        })?;

        for commit in commits {
            commit();
        }
        tracing::debug!(resources = ?labels, "group loaded");
        Ok(())
    }
}

/// Loads two collections together and returns what was fetched.
///
/// Either both collections are replaced or neither is. An unmounted sync keeps
/// its old contents, but the fetched records are still returned.
pub async fn load_pair<'a, A, B, FA, FutA, FB, FutB>(
    first: (&'a ResourceSync<A>, FA),
    second: (&'a ResourceSync<B>, FB),
) -> Result<(Vec<A>, Vec<B>), SyncError>
where
    A: Resource,
    B: Resource,
    FA: FnOnce() -> FutA + 'a,
    FutA: Future<Output = Result<Option<Vec<A>>, NetworkError>> + 'a,
    FB: FnOnce() -> FutB + 'a,
    FutB: Future<Output = Result<Option<Vec<B>>, NetworkError>> + 'a,
{
    let (a, fetch_a) = first;
    let (b, fetch_b) = second;
    let (a_items, b_items) = future::try_join(
        async move { Ok::<_, NetworkError>(fetch_a().await?.unwrap_or_default()) },
        async move { Ok::<_, NetworkError>(fetch_b().await?.unwrap_or_default()) },
    )
    .await
    .map_err(|error| {
        tracing::warn!(resources = ?[a.label(), b.label()], error = %error, "pair load failed");
        error
    })?;

    a.replace_all(a_items.clone());
    b.replace_all(b_items.clone());
    Ok((a_items, b_items))
}
