//! Suggestion resolution: local filtering or asynchronous providers.
//!
//! [`SuggestionResolver`] turns a query into candidate items. Static
//! collections are filtered synchronously; a configured [`ItemsProvider`]
//! takes precedence and yields a future that the widget runs off the UI
//! thread. Provider failures never escape: [`settle_provider`] converts
//! errors and panics into an empty result.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use horizon_autocomplete_core::logging::targets;
use horizon_autocomplete_core::PerfSpan;

use crate::item_text::{Item, ItemText};

/// Error type returned by item providers.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// The future returned by an [`ItemsProvider`].
pub type ProviderFuture<T> = BoxFuture<'static, Result<Vec<T>, ProviderError>>;

/// An asynchronous source of suggestions.
///
/// Implementations typically perform I/O; the returned future is polled on
/// the widget's async runtime, never on the UI thread.
pub trait ItemsProvider<T>: Send + Sync {
    /// Look up items for `query`.
    fn provide(&self, query: &str) -> ProviderFuture<T>;
}

/// Adapter implementing [`ItemsProvider`] for an async closure.
pub struct ProviderFn<F> {
    f: F,
}

/// Wrap an async closure as an [`ItemsProvider`].
///
/// ```
/// use horizon_autocomplete::{provider_fn, ProviderError};
///
/// let provider = provider_fn(|query: String| async move {
///     Ok::<_, ProviderError>(vec![format!("{query}!")])
/// });
/// # let _ = provider;
/// ```
pub fn provider_fn<F>(f: F) -> ProviderFn<F> {
    ProviderFn { f }
}

impl<T, F, Fut> ItemsProvider<T> for ProviderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, ProviderError>> + Send + 'static,
{
    fn provide(&self, query: &str) -> ProviderFuture<T> {
        (self.f)(query.to_owned()).boxed()
    }
}

/// What the resolver produced for a query.
pub enum Resolution<T> {
    /// Results are available now.
    Ready(Vec<T>),
    /// Results will arrive when the provider future completes.
    Pending(ProviderFuture<T>),
}

impl<T> std::fmt::Debug for Resolution<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(items) => f.debug_tuple("Ready").field(&items.len()).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Produces candidate items for a query.
pub struct SuggestionResolver<T> {
    items: Vec<T>,
    provider: Option<Arc<dyn ItemsProvider<T>>>,
}

impl<T: Item> SuggestionResolver<T> {
    /// Create a resolver over a static collection.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            provider: None,
        }
    }

    /// The static item collection.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Replace the static item collection.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Whether an asynchronous provider is configured.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Set or clear the asynchronous provider. When set, it is used instead
    /// of the static collection.
    pub fn set_provider(&mut self, provider: Option<Arc<dyn ItemsProvider<T>>>) {
        self.provider = provider;
    }

    /// Resolve `query` into candidates, truncated to `max_items`.
    ///
    /// Provider results are truncated by the caller once they arrive.
    pub fn resolve(&self, query: &str, text: &ItemText<T>, max_items: usize) -> Resolution<T> {
        match &self.provider {
            Some(provider) => {
                tracing::debug!(target: targets::RESOLVER, query, "querying provider");
                match std::panic::catch_unwind(AssertUnwindSafe(|| provider.provide(query))) {
                    Ok(future) => Resolution::Pending(future),
                    Err(_) => {
                        tracing::warn!(target: targets::RESOLVER, query, "provider panicked, treating as no results");
                        Resolution::Ready(Vec::new())
                    }
                }
            }
            None => {
                let mut results = filter_items(&self.items, query, text);
                results.truncate(max_items);
                Resolution::Ready(results)
            }
        }
    }
}

impl<T> std::fmt::Debug for SuggestionResolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionResolver")
            .field("items", &self.items.len())
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

/// Case-insensitive substring filtering over a static collection.
///
/// An empty query matches nothing. Original order is preserved.
pub fn filter_items<T: Item>(items: &[T], query: &str, text: &ItemText<T>) -> Vec<T> {
    if query.is_empty() {
        return Vec::new();
    }

    let _span = PerfSpan::new("filter_items");
    let needle = query.to_lowercase();
    let results: Vec<T> = items
        .iter()
        .filter(|item| text.resolve(item).to_lowercase().contains(&needle))
        .cloned()
        .collect();

    tracing::trace!(
        target: targets::RESOLVER,
        query,
        candidates = items.len(),
        matches = results.len(),
        "filtered static items"
    );
    results
}

/// Await a provider future, absorbing failures.
///
/// Errors and panics are logged and yield an empty result.
pub async fn settle_provider<T>(query: String, future: ProviderFuture<T>) -> Vec<T> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(items)) => {
            tracing::debug!(target: targets::RESOLVER, %query, count = items.len(), "provider returned");
            items
        }
        Ok(Err(err)) => {
            tracing::warn!(target: targets::RESOLVER, %query, %err, "provider failed, treating as no results");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(target: targets::RESOLVER, %query, "provider panicked, treating as no results");
            Vec::new()
        }
    }
}
