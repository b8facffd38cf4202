//! Horizon Autocomplete - a headless autocomplete input controller.
//!
//! The [`Autocomplete`] widget turns keystrokes, focus and pointer events
//! into a debounced, asynchronous suggestion lookup and a keyboard-navigable
//! suggestion list. It draws nothing: hosts forward [`InputEvent`]s, call
//! [`Autocomplete::tick`] from their event loop and render the rows produced
//! by [`Autocomplete::render_rows`].
//!
//! - [`AutocompleteConfig`] / [`AutocompleteOptions`]: setup, loadable from TOML
//! - [`ItemsProvider`]: asynchronous suggestion sources
//! - [`ItemText`]: how an item's display text is found
//! - [`RowRenderer`]: how a suggestion row is presented
//!
//! # Example
//!
//! ```
//! use horizon_autocomplete::{provider_fn, Autocomplete, AutocompleteConfig, InputEvent, Key};
//! use horizon_autocomplete::{AsyncRuntime, AsyncRuntimeConfig, ProviderError};
//! use std::time::{Duration, Instant};
//!
//! let runtime = AsyncRuntime::new(AsyncRuntimeConfig::new()).unwrap();
//! let config = AutocompleteConfig::new()
//!     .with_provider(provider_fn(|query: String| async move {
//!         Ok::<_, ProviderError>(vec![format!("{query} street"), format!("{query} avenue")])
//!     }))
//!     .with_runtime(runtime.handle().clone());
//! let mut autocomplete = Autocomplete::new(config);
//!
//! let start = Instant::now();
//! autocomplete.handle_event_at(InputEvent::key_up(Key::Character('m'), "elm"), start);
//! autocomplete.tick_at(start + Duration::from_millis(100));
//! assert!(autocomplete.wait_for_lookups(Duration::from_secs(5)));
//! assert_eq!(autocomplete.suggestions().len(), 2);
//! ```

mod autocomplete;
mod config;
mod error;
mod events;
mod item_text;
mod navigation;
mod render;
mod resolver;
mod trigger;

pub use autocomplete::Autocomplete;
pub use config::{
    AutocompleteConfig, AutocompleteOptions, DEFAULT_CLOSE_GRACE, DEFAULT_MAX_VIEWABLE_ITEMS,
};
pub use error::{ConfigError, Result};
pub use events::{InputEvent, Key};
pub use item_text::{Item, ItemText, PathExpression, TextResolverFn};
pub use navigation::{Navigation, NavigationState};
pub use render::{
    render_fn, DefaultRowRenderer, RenderFn, RowContext, RowRenderer, RowView, SuggestionIdSeed,
};
pub use resolver::{
    filter_items, provider_fn, ItemsProvider, ProviderError, ProviderFn, ProviderFuture,
    Resolution, SuggestionResolver,
};
pub use trigger::{is_value_change, QueryTrigger, DEFAULT_DEBOUNCE};

pub use horizon_autocomplete_core::{
    AsyncRuntime, AsyncRuntimeConfig, ConnectionGuard, ConnectionId, Signal,
};
