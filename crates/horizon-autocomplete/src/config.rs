//! Autocomplete configuration.
//!
//! [`AutocompleteOptions`] holds the plain, serializable settings and can be
//! loaded from TOML:
//!
//! ```toml
//! max-viewable-items = 5
//! highlight-first = true
//! text-expression = "name"
//! debounce-ms = 150
//! ```
//!
//! [`AutocompleteConfig`] adds the host-supplied pieces (items, provider,
//! text resolver, runtime) on top of the options.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use horizon_autocomplete_core::logging::targets;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::error::{ConfigError, Result};
use crate::item_text::TextResolverFn;
use crate::render::SuggestionIdSeed;
use crate::resolver::ItemsProvider;

/// Default maximum number of suggestions shown at once.
pub const DEFAULT_MAX_VIEWABLE_ITEMS: usize = 7;

/// Default delay before a blurred input closes the list after the pointer
/// leaves the suggestions.
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Serializable autocomplete settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AutocompleteOptions {
    /// Maximum number of suggestions shown. Must be at least 1.
    pub max_viewable_items: usize,
    /// Highlight the first suggestion whenever a new list is shown.
    pub highlight_first: bool,
    /// Dot-path expression locating an item's display text.
    pub text_expression: Option<String>,
    /// Debounce window for typed input, in milliseconds.
    pub debounce_ms: u64,
    /// Grace period before closing after the pointer leaves, in milliseconds.
    pub close_grace_ms: u64,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            max_viewable_items: DEFAULT_MAX_VIEWABLE_ITEMS,
            highlight_first: false,
            text_expression: None,
            debounce_ms: crate::trigger::DEFAULT_DEBOUNCE.as_millis() as u64,
            close_grace_ms: DEFAULT_CLOSE_GRACE.as_millis() as u64,
        }
    }
}

impl AutocompleteOptions {
    /// Parse and validate options from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Read, parse and validate options from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|source| ConfigError::io(path, source))?;
        let options = Self::from_toml_str(&source)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded autocomplete options");
        Ok(options)
    }

    /// Check that every option is within range.
    pub fn validate(&self) -> Result<()> {
        if self.max_viewable_items == 0 {
            return Err(ConfigError::invalid_value(
                "max-viewable-items",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// The debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The close grace period.
    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}

/// Full configuration for an [`Autocomplete`](crate::Autocomplete).
///
/// # Example
///
/// ```
/// use horizon_autocomplete::AutocompleteConfig;
///
/// let config = AutocompleteConfig::new()
///     .with_items(vec!["Canada".to_string(), "Chile".to_string()])
///     .with_highlight_first(true)
///     .with_max_viewable_items(5);
/// assert_eq!(config.options().max_viewable_items, 5);
/// ```
pub struct AutocompleteConfig<T> {
    pub(crate) options: AutocompleteOptions,
    pub(crate) items: Vec<T>,
    pub(crate) provider: Option<Arc<dyn ItemsProvider<T>>>,
    pub(crate) text_resolver: Option<TextResolverFn<T>>,
    pub(crate) runtime: Option<Handle>,
    pub(crate) seed: Option<SuggestionIdSeed>,
}

impl<T> AutocompleteConfig<T> {
    /// Create a configuration with default options and no data source.
    pub fn new() -> Self {
        Self {
            options: AutocompleteOptions::default(),
            items: Vec::new(),
            provider: None,
            text_resolver: None,
            runtime: None,
            seed: None,
        }
    }

    /// The serializable options.
    pub fn options(&self) -> &AutocompleteOptions {
        &self.options
    }

    /// Replace all serializable options.
    pub fn with_options(mut self, options: AutocompleteOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the static item collection.
    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    /// Set the asynchronous provider. It takes precedence over static items.
    pub fn with_provider(mut self, provider: impl ItemsProvider<T> + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set the dot-path expression locating an item's display text.
    pub fn with_text_expression(mut self, expression: impl Into<String>) -> Self {
        self.options.text_expression = Some(expression.into());
        self
    }

    /// Set a custom text resolver. It takes precedence over the expression.
    pub fn with_text_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.text_resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the maximum number of suggestions shown (clamped to at least 1).
    pub fn with_max_viewable_items(mut self, count: usize) -> Self {
        self.options.max_viewable_items = count.max(1);
        self
    }

    /// Highlight the first suggestion whenever a new list is shown.
    pub fn with_highlight_first(mut self, highlight_first: bool) -> Self {
        self.options.highlight_first = highlight_first;
        self
    }

    /// Set the debounce window for typed input.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.options.debounce_ms = debounce.as_millis() as u64;
        self
    }

    /// Set the grace period before closing after the pointer leaves.
    pub fn with_close_grace(mut self, grace: Duration) -> Self {
        self.options.close_grace_ms = grace.as_millis() as u64;
        self
    }

    /// Run provider lookups on this Tokio runtime instead of the global one.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Use a fixed row identifier seed instead of generating one.
    pub fn with_seed(mut self, seed: SuggestionIdSeed) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl<T> Default for AutocompleteConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for AutocompleteConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteConfig")
            .field("options", &self.options)
            .field("items", &self.items.len())
            .field("has_provider", &self.provider.is_some())
            .field("has_text_resolver", &self.text_resolver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = AutocompleteOptions::default();
        assert_eq!(options.max_viewable_items, 7);
        assert!(!options.highlight_first);
        assert_eq!(options.debounce(), Duration::from_millis(100));
        assert_eq!(options.close_grace(), Duration::from_millis(500));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str() {
        let options = AutocompleteOptions::from_toml_str(
            r#"
            max-viewable-items = 3
            highlight-first = true
            text-expression = "name"
            "#,
        )
        .unwrap();

        assert_eq!(options.max_viewable_items, 3);
        assert!(options.highlight_first);
        assert_eq!(options.text_expression.as_deref(), Some("name"));
        assert_eq!(options.debounce_ms, 100);
    }

    #[test]
    fn test_zero_max_items_rejected() {
        let err = AutocompleteOptions::from_toml_str("max-viewable-items = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("max-viewable-items"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = AutocompleteOptions::from_toml_str("max-items = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce-ms = 250").unwrap();

        let options = AutocompleteOptions::from_toml_file(file.path()).unwrap();
        assert_eq!(options.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_missing_file() {
        let err = AutocompleteOptions::from_toml_file("/nonexistent/autocomplete.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_builder_clamps_max_items() {
        let config = AutocompleteConfig::<String>::new().with_max_viewable_items(0);
        assert_eq!(config.options().max_viewable_items, 1);
    }
}
