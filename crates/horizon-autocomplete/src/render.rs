//! Row rendering strategies and stable row identifiers.
//!
//! The widget does not draw anything itself. For each suggestion it builds a
//! [`RowContext`] and hands it to a [`RowRenderer`]; the renderer's output is
//! whatever the host's rendering surface consumes. [`DefaultRowRenderer`]
//! produces a plain [`RowView`].
//!
//! A rendered row commits its item when the host forwards
//! [`InputEvent::RowClicked`](crate::InputEvent::RowClicked) with the row's
//! index, or calls [`Autocomplete::commit`](crate::Autocomplete::commit).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::events::InputEvent;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Per-instance token from which row identifiers are derived.
///
/// Generated once when the widget is constructed and kept for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuggestionIdSeed(String);

impl SuggestionIdSeed {
    /// Create a seed from an explicit prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    /// Generate a fresh seed from an instance counter and the creation time.
    pub fn generate() -> Self {
        let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        Self(format!("suggestion-{millis}-{instance}"))
    }

    /// The identifier of the row at `index`.
    pub fn row_id(&self, index: usize) -> String {
        format!("{}-{}", self.0, index)
    }

    /// The seed as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuggestionIdSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a renderer needs to draw one suggestion row.
#[derive(Debug)]
pub struct RowContext<'a, T> {
    /// The suggested item.
    pub item: &'a T,
    /// Position in the suggestion list.
    pub index: usize,
    /// Stable identifier for this row.
    pub id: String,
    /// The item's resolved display text.
    pub label: &'a str,
    /// Whether the item equals the current selection.
    pub selected: bool,
    /// Whether the row is highlighted by keyboard navigation.
    pub highlighted: bool,
}

impl<T> RowContext<'_, T> {
    /// The event that commits this row, for the host to forward when the
    /// row is activated.
    pub fn commit_event(&self) -> InputEvent {
        InputEvent::RowClicked(self.index)
    }
}

/// Strategy for turning a suggestion into something the host can draw.
pub trait RowRenderer<T>: Send + Sync {
    /// What a rendered row looks like to the host.
    type Output;

    /// Render a single row.
    fn render_row(&self, row: &RowContext<'_, T>) -> Self::Output;
}

/// Plain description of a suggestion row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    pub index: usize,
    pub label: String,
    pub selected: bool,
    pub highlighted: bool,
}

/// Renders rows as [`RowView`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRowRenderer;

impl<T> RowRenderer<T> for DefaultRowRenderer {
    type Output = RowView;

    fn render_row(&self, row: &RowContext<'_, T>) -> RowView {
        RowView {
            id: row.id.clone(),
            index: row.index,
            label: row.label.to_owned(),
            selected: row.selected,
            highlighted: row.highlighted,
        }
    }
}

/// Adapter implementing [`RowRenderer`] for a closure.
pub struct RenderFn<F> {
    f: F,
}

/// Wrap a closure as a [`RowRenderer`].
pub fn render_fn<F>(f: F) -> RenderFn<F> {
    RenderFn { f }
}

impl<T, F, O> RowRenderer<T> for RenderFn<F>
where
    F: Fn(&RowContext<'_, T>) -> O + Send + Sync,
{
    type Output = O;

    fn render_row(&self, row: &RowContext<'_, T>) -> O {
        (self.f)(row)
    }
}

impl<F> fmt::Debug for RenderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderFn(..)")
    }
}
