//! Display text resolution for suggestion items.
//!
//! Every item shown in the list needs a label, and local filtering matches
//! against that same label. The strategy is picked once from configuration:
//!
//! 1. a host-supplied resolver function,
//! 2. a dot-path expression evaluated against the item's serialized form,
//! 3. identity, for items that serialize to a plain string.
//!
//! Resolution never fails: anything that cannot produce text yields the
//! item's own string form, or an empty label.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use horizon_autocomplete_core::logging::targets;
use serde::Serialize;
use serde_json::Value;

/// Values that can be offered as suggestions.
///
/// Blanket-implemented for every cloneable, serializable, thread-safe type:
/// plain strings and host-defined records alike.
pub trait Item: Clone + Serialize + Send + Sync + 'static {}

impl<T: Clone + Serialize + Send + Sync + 'static> Item for T {}

/// A host-supplied text resolver. Returning `None` means "no text".
pub type TextResolverFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// A parsed dot-path expression such as `name`, `title.en` or `tags[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    source: String,
    segments: Vec<String>,
}

impl PathExpression {
    /// Parse an expression. Bracketed indices are treated as path segments,
    /// so `tags[0].label` and `tags.0.label` are equivalent.
    pub fn parse(expression: &str) -> Self {
        let normalized = expression.replace('[', ".").replace(']', "");
        let segments = normalized
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            source: expression.to_owned(),
            segments,
        }
    }

    /// The expression as originally written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate the expression against a JSON value.
    ///
    /// Strings resolve to themselves, numbers and booleans to their display
    /// form. Anything else, including a missing path, resolves to `None`.
    pub fn evaluate(&self, value: &Value) -> Option<String> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        leaf_text(current)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn leaf_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_json<T: Serialize>(item: &T) -> Option<Value> {
    match serde_json::to_value(item) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(target: targets::ITEM_TEXT, %err, "item failed to serialize");
            None
        }
    }
}

/// The item's own text, if it is a string.
fn identity_text<T: Serialize>(item: &T) -> Option<String> {
    match to_json(item)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// The strategy used to turn an item into its display text.
pub enum ItemText<T> {
    /// Use the item itself when it is a string.
    Identity,
    /// Evaluate a dot-path expression against the item.
    Path(PathExpression),
    /// Call a host-supplied resolver.
    Custom(TextResolverFn<T>),
}

impl<T: Serialize> ItemText<T> {
    /// Pick the strategy for the given configuration.
    ///
    /// A custom resolver wins over an expression; an empty expression is
    /// treated as absent.
    pub fn select(resolver: Option<&TextResolverFn<T>>, expression: Option<&str>) -> Self {
        if let Some(resolver) = resolver {
            return Self::Custom(resolver.clone());
        }
        match expression {
            Some(expr) if !expr.trim().is_empty() => Self::Path(PathExpression::parse(expr)),
            _ => Self::Identity,
        }
    }

    /// Resolve the display text of `item`.
    pub fn resolve(&self, item: &T) -> String {
        let text = match self {
            Self::Identity => None,
            Self::Path(path) => to_json(item).and_then(|value| path.evaluate(&value)),
            Self::Custom(resolver) => match panic::catch_unwind(AssertUnwindSafe(|| resolver(item))) {
                Ok(text) => text,
                Err(_) => {
                    tracing::debug!(target: targets::ITEM_TEXT, "text resolver panicked");
                    None
                }
            },
        };

        match text {
            Some(text) if !text.is_empty() => text,
            _ => identity_text(item).unwrap_or_default(),
        }
    }
}

impl<T> Clone for ItemText<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Path(path) => Self::Path(path.clone()),
            Self::Custom(resolver) => Self::Custom(resolver.clone()),
        }
    }
}

impl<T> Default for ItemText<T> {
    fn default() -> Self {
        Self::Identity
    }
}

impl<T> fmt::Debug for ItemText<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Path(path) => f.debug_tuple("Path").field(&path.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
