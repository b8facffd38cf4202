//! The autocomplete component.
//!
//! [`Autocomplete`] wires the query trigger, the suggestion resolver and the
//! navigation state machine together. It is driven entirely by its host:
//!
//! - input events go through [`Autocomplete::handle_event_at`];
//! - timers and finished provider lookups are applied by
//!   [`Autocomplete::tick_at`], which the host calls from its event loop
//!   (see [`Autocomplete::next_timeout`] and [`Autocomplete::set_wake_handler`]);
//! - state changes are announced through the public [`Signal`] fields.
//!
//! # Example
//!
//! ```
//! use horizon_autocomplete::{Autocomplete, AutocompleteConfig, InputEvent, Key};
//! use std::time::{Duration, Instant};
//!
//! let config = AutocompleteConfig::new()
//!     .with_items(vec!["Canada".to_string(), "Colombia".to_string(), "Chile".to_string()])
//!     .with_highlight_first(true);
//! let mut autocomplete = Autocomplete::new(config);
//!
//! let start = Instant::now();
//! autocomplete.handle_event_at(InputEvent::Focus, start);
//! autocomplete.handle_event_at(InputEvent::key_up(Key::Character('o'), "co"), start);
//! autocomplete.tick_at(start + Duration::from_millis(100));
//! assert_eq!(autocomplete.suggestions(), ["Colombia".to_string()]);
//!
//! autocomplete.handle_event_at(InputEvent::key_up(Key::Enter, "co"), start);
//! assert_eq!(autocomplete.selected_item().map(String::as_str), Some("Colombia"));
//! assert_eq!(autocomplete.value(), "Colombia");
//! assert!(!autocomplete.is_open());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use horizon_autocomplete_core::async_runtime::spawn_with_callback_on;
use horizon_autocomplete_core::logging::targets;
use horizon_autocomplete_core::{AsyncRuntime, Signal, TimerId, TimerManager};
use tokio::runtime::Handle;

use crate::config::{AutocompleteConfig, AutocompleteOptions};
use crate::events::{InputEvent, Key};
use crate::item_text::{Item, ItemText, TextResolverFn};
use crate::navigation::{Navigation, NavigationState};
use crate::render::{DefaultRowRenderer, RowContext, RowRenderer, SuggestionIdSeed};
use crate::resolver::{settle_provider, ItemsProvider, ProviderFuture, Resolution, SuggestionResolver};
use crate::trigger::{self, QueryTrigger};

/// Work scheduled on the component's timers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeferredAction {
    /// Run a lookup for the debounced value.
    Lookup(String),
    /// Close the list if the input is still blurred and unhovered.
    GraceClose,
}

/// A provider result on its way back to the UI thread.
struct LookupCompletion<T> {
    generation: u64,
    query: String,
    items: Vec<T>,
}

type WakeHandler = Arc<dyn Fn() + Send + Sync>;

/// An autocomplete input controller.
///
/// `T` is the item type; `R` the row renderer used by
/// [`render_rows`](Self::render_rows).
pub struct Autocomplete<T, R = DefaultRowRenderer> {
    options: AutocompleteOptions,
    text_resolver: Option<TextResolverFn<T>>,
    item_text: ItemText<T>,
    resolver: SuggestionResolver<T>,
    renderer: R,

    trigger: QueryTrigger,
    close_grace: Duration,
    grace_timer: Option<TimerId>,
    timers: TimerManager<DeferredAction>,

    navigation: Navigation,
    suggestions: Vec<T>,
    value: String,
    selected_item: Option<T>,
    seed: SuggestionIdSeed,

    /// Generation of the most recent lookup; older completions are stale.
    generation: u64,
    in_flight: usize,
    completion_tx: Sender<LookupCompletion<T>>,
    completion_rx: Receiver<LookupCompletion<T>>,
    runtime: Option<Handle>,
    wake_handler: Option<WakeHandler>,

    // Signals
    /// Emitted with the committed item when a selection is made.
    pub changed: Signal<T>,
    /// Emitted when the highlighted suggestion changes.
    pub highlighted: Signal<T>,
    /// Emitted when the input gains focus.
    pub focus_gained: Signal<()>,
    /// Emitted when the input loses focus.
    pub focus_lost: Signal<()>,
    /// Emitted when the suggestion list is shown (`true`) or hidden (`false`).
    pub opened_changed: Signal<bool>,
    /// Emitted whenever the rendering surface should redraw.
    pub update_requested: Signal<()>,
}

impl<T: Item> Autocomplete<T> {
    /// Create a component rendering rows with [`DefaultRowRenderer`].
    pub fn new(config: AutocompleteConfig<T>) -> Self {
        Self::with_renderer(config, DefaultRowRenderer)
    }
}

impl<T: Item, R: RowRenderer<T>> Autocomplete<T, R> {
    /// Create a component with a custom row renderer.
    pub fn with_renderer(config: AutocompleteConfig<T>, renderer: R) -> Self {
        let AutocompleteConfig {
            mut options,
            items,
            provider,
            text_resolver,
            runtime,
            seed,
        } = config;

        options.max_viewable_items = options.max_viewable_items.max(1);
        let item_text = ItemText::select(text_resolver.as_ref(), options.text_expression.as_deref());
        let mut resolver = SuggestionResolver::new(items);
        resolver.set_provider(provider);
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();

        Self {
            trigger: QueryTrigger::new(options.debounce()),
            close_grace: options.close_grace(),
            options,
            text_resolver,
            item_text,
            resolver,
            renderer,
            grace_timer: None,
            timers: TimerManager::new(),
            navigation: Navigation::new(),
            suggestions: Vec::new(),
            value: String::new(),
            selected_item: None,
            seed: seed.unwrap_or_else(SuggestionIdSeed::generate),
            generation: 0,
            in_flight: 0,
            completion_tx,
            completion_rx,
            runtime,
            wake_handler: None,
            changed: Signal::new(),
            highlighted: Signal::new(),
            focus_gained: Signal::new(),
            focus_lost: Signal::new(),
            opened_changed: Signal::new(),
            update_requested: Signal::new(),
        }
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Handle an input event at the current time.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        self.handle_event_at(event, Instant::now())
    }

    /// Handle an input event that occurred at `now`.
    ///
    /// Returns `true` if the event was consumed and should not be processed
    /// further by the host (e.g. arrow keys must not move the caret).
    #[tracing::instrument(skip(self), target = "horizon_autocomplete::widget", level = "trace")]
    pub fn handle_event_at(&mut self, event: InputEvent, now: Instant) -> bool {
        match event {
            InputEvent::KeyDown(key) => key.is_highlight_navigation(),
            InputEvent::KeyUp { key, value } => self.handle_key_up(key, value, now),
            InputEvent::Focus => {
                self.handle_focus();
                false
            }
            InputEvent::Blur => {
                self.handle_blur();
                false
            }
            InputEvent::PointerEnter => {
                self.navigation.pointer_enter();
                false
            }
            InputEvent::PointerLeave => {
                self.handle_pointer_leave(now);
                false
            }
            InputEvent::RowClicked(index) => self.commit_index(index),
        }
    }

    fn handle_key_up(&mut self, key: Key, value: String, now: Instant) -> bool {
        self.value = value;

        match key {
            Key::ArrowUp => {
                if let Some(index) = self.navigation.move_up() {
                    self.highlight_changed(index);
                }
                true
            }
            Key::ArrowDown => {
                if let Some(index) = self.navigation.move_down(self.suggestions.len()) {
                    self.highlight_changed(index);
                }
                true
            }
            Key::Enter => {
                if !self.value.is_empty() && !self.navigation.is_open() {
                    self.trigger.cancel(&mut self.timers);
                    let query = self.value.clone();
                    self.lookup(query);
                    return true;
                }
                match self.navigation.highlight() {
                    Some(index) => self.commit_index(index),
                    None => false,
                }
            }
            Key::Escape => self.close(),
            key => {
                debug_assert!(trigger::is_value_change(&key));
                let action = DeferredAction::Lookup(self.value.clone());
                self.trigger.schedule(&mut self.timers, now, action);
                false
            }
        }
    }

    fn handle_focus(&mut self) {
        self.navigation.focus();
        self.focus_gained.emit(());
        if !self.suggestions.is_empty() {
            self.open();
        }
    }

    fn handle_blur(&mut self) {
        let close_now = self.navigation.blur();
        self.focus_lost.emit(());
        if close_now {
            self.close();
        }
    }

    fn handle_pointer_leave(&mut self, now: Instant) {
        if !self.navigation.pointer_leave() {
            return;
        }
        if let Some(id) = self.grace_timer.take() {
            let _ = self.timers.stop(id);
        }
        let id = self
            .timers
            .start_one_shot(now, self.close_grace, DeferredAction::GraceClose);
        self.grace_timer = Some(id);
    }

    fn highlight_changed(&mut self, index: usize) {
        if let Some(item) = self.suggestions.get(index) {
            self.highlighted.emit(item.clone());
        }
        self.update_requested.emit(());
    }

    // =========================================================================
    // Timers and Lookups
    // =========================================================================

    /// Fire due timers and apply finished lookups at the current time.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Fire timers due at `now` and apply finished lookups.
    pub fn tick_at(&mut self, now: Instant) {
        for (id, action) in self.timers.process_expired(now) {
            match action {
                DeferredAction::Lookup(query) => {
                    if self.trigger.fired(id) {
                        self.lookup(query);
                    }
                }
                DeferredAction::GraceClose => {
                    if self.grace_timer == Some(id) {
                        self.grace_timer = None;
                        if self.navigation.should_close_after_grace() {
                            self.close();
                        }
                    }
                }
            }
        }
        self.process_lookups();
    }

    /// Time from `now` until the next timer is due, if any.
    pub fn next_timeout(&mut self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    /// Number of provider lookups whose results have not been applied yet.
    pub fn pending_lookups(&self) -> usize {
        self.in_flight
    }

    /// Whether a debounced lookup is waiting for its timer.
    pub fn has_pending_query(&self) -> bool {
        self.trigger.is_pending()
    }

    /// Apply every provider result that has arrived. Returns how many
    /// completions were received, stale ones included.
    pub fn process_lookups(&mut self) -> usize {
        let mut received = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            received += 1;
            self.apply_completion(completion);
        }
        received
    }

    /// Block until a provider result arrives or `timeout` elapses, then apply
    /// everything that has arrived.
    ///
    /// Returns `false` if nothing arrived. Intended for tests and simple
    /// hosts; event-loop hosts should use the wake handler instead.
    pub fn wait_for_lookups(&mut self, timeout: Duration) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completion_rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.apply_completion(completion);
                self.process_lookups();
                true
            }
            Err(_) => false,
        }
    }

    /// Resolve `query` right away, bypassing the debounce.
    pub fn lookup(&mut self, query: String) {
        self.generation += 1;
        let generation = self.generation;
        tracing::debug!(target: targets::WIDGET, %query, generation, "lookup");

        match self
            .resolver
            .resolve(&query, &self.item_text, self.options.max_viewable_items)
        {
            Resolution::Ready(items) => self.suggest(items),
            Resolution::Pending(future) => self.spawn_lookup(generation, query, future),
        }
    }

    fn spawn_lookup(&mut self, generation: u64, query: String, future: ProviderFuture<T>) {
        let handle = match &self.runtime {
            Some(handle) => handle.clone(),
            None => match AsyncRuntime::try_global() {
                Ok(runtime) => runtime.handle().clone(),
                Err(err) => {
                    tracing::warn!(target: targets::RESOLVER, %err, "no async runtime, treating as no results");
                    self.suggest(Vec::new());
                    return;
                }
            },
        };

        let tx = self.completion_tx.clone();
        let wake = self.wake_handler.clone();
        let settled = settle_provider(query.clone(), future);
        self.in_flight += 1;

        spawn_with_callback_on(
            &handle,
            settled,
            move |items| {
                let _ = tx.send(LookupCompletion {
                    generation,
                    query,
                    items,
                });
                if let Some(wake) = wake {
                    wake();
                }
            },
            None,
        );
    }

    fn apply_completion(&mut self, completion: LookupCompletion<T>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if completion.generation != self.generation {
            tracing::debug!(
                target: targets::RESOLVER,
                query = %completion.query,
                generation = completion.generation,
                latest = self.generation,
                "discarding stale lookup result"
            );
            return;
        }

        self.suggest(completion.items);
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Show the suggestion list. No-op when there are no suggestions.
    pub fn open(&mut self) {
        let had_highlight = self.navigation.highlight();
        if self
            .navigation
            .open(self.suggestions.len(), self.options.highlight_first)
        {
            tracing::trace!(target: targets::WIDGET, "opened");
            self.opened_changed.emit(true);
            if had_highlight.is_none() {
                if let Some(index) = self.navigation.highlight() {
                    self.highlighted.emit(self.suggestions[index].clone());
                }
            }
            self.update_requested.emit(());
        }
    }

    /// Hide the suggestion list and clear the highlight.
    ///
    /// Returns `true` if the list was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.navigation.close();
        if was_open {
            tracing::trace!(target: targets::WIDGET, "closed");
            self.opened_changed.emit(false);
            self.update_requested.emit(());
        }
        was_open
    }

    /// Replace the current suggestions.
    ///
    /// The list is truncated to `max_viewable_items`; a non-empty list opens,
    /// an empty one closes.
    pub fn suggest(&mut self, mut items: Vec<T>) {
        items.truncate(self.options.max_viewable_items);
        self.suggestions = items;

        let was_open = self.navigation.is_open();
        self.navigation
            .list_replaced(self.suggestions.len(), self.options.highlight_first);
        let is_open = self.navigation.is_open();

        tracing::debug!(target: targets::WIDGET, count = self.suggestions.len(), is_open, "suggestions replaced");

        if was_open != is_open {
            self.opened_changed.emit(is_open);
        }
        if let Some(index) = self.navigation.highlight() {
            self.highlighted.emit(self.suggestions[index].clone());
        }
        self.update_requested.emit(());
    }

    /// Commit `item` as the selection.
    ///
    /// Sets the selected item and the input value, drops pending lookups,
    /// emits [`changed`](Self::changed), then clears and closes the list.
    pub fn commit(&mut self, item: T) {
        self.value = self.item_text.resolve(&item);
        self.selected_item = Some(item.clone());

        // Results of lookups started before the commit must not reopen the list.
        self.generation += 1;
        self.trigger.cancel(&mut self.timers);

        tracing::debug!(target: targets::WIDGET, value = %self.value, "committed selection");
        self.changed.emit(item);

        self.suggestions.clear();
        let was_open = self.navigation.close();
        if was_open {
            self.opened_changed.emit(false);
        }
        self.update_requested.emit(());
    }

    fn commit_index(&mut self, index: usize) -> bool {
        match self.suggestions.get(index).cloned() {
            Some(item) => {
                self.commit(item);
                true
            }
            None => {
                tracing::trace!(target: targets::WIDGET, index, "ignoring commit of missing row");
                false
            }
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the static item collection.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.resolver.set_items(items);
    }

    /// Set the asynchronous provider.
    pub fn set_provider(&mut self, provider: impl ItemsProvider<T> + 'static) {
        self.resolver.set_provider(Some(Arc::new(provider)));
    }

    /// Remove the asynchronous provider, falling back to static items.
    pub fn clear_provider(&mut self) {
        self.resolver.set_provider(None);
    }

    /// Set or clear the dot-path text expression.
    pub fn set_text_expression(&mut self, expression: Option<String>) {
        self.options.text_expression = expression;
        self.recompute_item_text();
    }

    /// Set or clear the custom text resolver.
    pub fn set_text_resolver(&mut self, resolver: Option<TextResolverFn<T>>) {
        self.text_resolver = resolver;
        self.recompute_item_text();
    }

    fn recompute_item_text(&mut self) {
        self.item_text = ItemText::select(
            self.text_resolver.as_ref(),
            self.options.text_expression.as_deref(),
        );
        tracing::trace!(target: targets::ITEM_TEXT, strategy = ?self.item_text, "text strategy selected");
        self.update_requested.emit(());
    }

    /// Set the maximum number of suggestions shown (clamped to at least 1).
    pub fn set_max_viewable_items(&mut self, count: usize) {
        self.options.max_viewable_items = count.max(1);
        if self.suggestions.len() > self.options.max_viewable_items {
            let items = std::mem::take(&mut self.suggestions);
            self.suggest(items);
        }
    }

    /// Highlight the first suggestion whenever a new list is shown.
    pub fn set_highlight_first(&mut self, highlight_first: bool) {
        self.options.highlight_first = highlight_first;
    }

    /// Set the debounce window for typed input.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.options.debounce_ms = debounce.as_millis() as u64;
        self.trigger.set_delay(debounce);
    }

    /// Set the grace period before closing after the pointer leaves.
    pub fn set_close_grace(&mut self, grace: Duration) {
        self.options.close_grace_ms = grace.as_millis() as u64;
        self.close_grace = grace;
    }

    /// Set the input's text without triggering a lookup.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Register a function called from the runtime thread whenever a provider
    /// result is ready, so the host can schedule a [`tick`](Self::tick).
    pub fn set_wake_handler<F>(&mut self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake_handler = Some(Arc::new(handler));
    }

    // =========================================================================
    // State Access
    // =========================================================================

    /// The current options.
    pub fn options(&self) -> &AutocompleteOptions {
        &self.options
    }

    /// The input's current text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The last committed item.
    pub fn selected_item(&self) -> Option<&T> {
        self.selected_item.as_ref()
    }

    /// The current suggestions.
    pub fn suggestions(&self) -> &[T] {
        &self.suggestions
    }

    /// The visibility and highlight state.
    pub fn state(&self) -> NavigationState {
        self.navigation.state()
    }

    /// Whether the suggestion list is shown.
    pub fn is_open(&self) -> bool {
        self.navigation.is_open()
    }

    /// The highlighted row, if any.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.navigation.highlight()
    }

    /// The highlighted row with `-1` for none.
    pub fn highlight_index(&self) -> i32 {
        self.navigation.highlight_index()
    }

    /// The highlighted suggestion, if any.
    pub fn highlighted_suggestion(&self) -> Option<&T> {
        self.navigation
            .highlight()
            .and_then(|index| self.suggestions.get(index))
    }

    /// Whether the input has focus.
    pub fn is_input_focused(&self) -> bool {
        self.navigation.input_focused()
    }

    /// Whether the pointer is over the suggestion surface.
    pub fn is_hovering_suggestions(&self) -> bool {
        self.navigation.hover_suggestions()
    }

    /// The display text of `item`.
    pub fn item_text(&self, item: &T) -> String {
        self.item_text.resolve(item)
    }

    /// The per-instance row identifier seed.
    pub fn seed(&self) -> &SuggestionIdSeed {
        &self.seed
    }

    /// The identifier of the suggestion row at `index`.
    pub fn suggestion_id(&self, index: usize) -> String {
        self.seed.row_id(index)
    }

    /// Render every current suggestion with the configured renderer.
    ///
    /// Rows are produced even while closed; hosts hide the surface when
    /// [`is_open`](Self::is_open) is `false`.
    pub fn render_rows(&self) -> Vec<R::Output> {
        let selected = self
            .selected_item
            .as_ref()
            .and_then(|item| serde_json::to_value(item).ok());
        let highlight = self.navigation.highlight();

        self.suggestions
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let label = self.item_text.resolve(item);
                let is_selected = selected
                    .as_ref()
                    .is_some_and(|selected| serde_json::to_value(item).ok().as_ref() == Some(selected));
                let row = RowContext {
                    item,
                    index,
                    id: self.seed.row_id(index),
                    label: &label,
                    selected: is_selected,
                    highlighted: highlight == Some(index),
                };
                self.renderer.render_row(&row)
            })
            .collect()
    }
}

impl<T, R> std::fmt::Debug for Autocomplete<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("value", &self.value)
            .field("state", &self.navigation.state())
            .field("suggestions", &self.suggestions.len())
            .field("has_selection", &self.selected_item.is_some())
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}
