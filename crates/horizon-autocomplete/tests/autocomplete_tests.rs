//! End-to-end tests for the autocomplete widget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use horizon_autocomplete::{
    AsyncRuntime, AsyncRuntimeConfig, Autocomplete, AutocompleteConfig, AutocompleteOptions,
    InputEvent, Key, NavigationState, ProviderError, RowContext, SuggestionIdSeed, provider_fn,
    render_fn,
};
use parking_lot::Mutex;
use serde::Serialize;

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn runtime() -> AsyncRuntime {
    AsyncRuntime::new(AsyncRuntimeConfig::new().with_worker_threads(2))
        .expect("failed to create runtime")
}

fn type_keys(ac: &mut Autocomplete<String>, value: &str, at: Instant) {
    let key = Key::Character(value.chars().last().unwrap_or(' '));
    ac.handle_event_at(InputEvent::key_up(key, value), at);
}

/// Wait until every in-flight lookup has been applied.
fn settle(ac: &mut Autocomplete<String>) {
    let deadline = Instant::now() + WAIT;
    while ac.pending_lookups() > 0 && Instant::now() < deadline {
        ac.wait_for_lookups(ms(100));
    }
    assert_eq!(ac.pending_lookups(), 0, "lookups did not settle");
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Address {
    city: String,
    street: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Person {
    name: String,
    address: Address,
}

fn person(name: &str, city: &str) -> Person {
    Person {
        name: name.into(),
        address: Address {
            city: city.into(),
            street: format!("1 {name} Way"),
        },
    }
}

#[test]
fn test_debounce_issues_single_lookup_with_latest_value() {
    init_tracing();
    let rt = runtime();
    let queries = Arc::new(Mutex::new(Vec::new()));
    let recorded = queries.clone();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(move |query: String| {
                recorded.lock().push(query.clone());
                async move { Ok::<_, ProviderError>(vec![format!("{query}ntry")]) }
            }))
            .with_runtime(rt.handle().clone()),
    );

    let start = Instant::now();
    type_keys(&mut ac, "c", start);
    type_keys(&mut ac, "co", start + ms(30));
    type_keys(&mut ac, "cou", start + ms(60));

    ac.tick_at(start + ms(150));
    assert!(queries.lock().is_empty());
    assert_eq!(ac.next_timeout(start + ms(150)), Some(ms(10)));

    ac.tick_at(start + ms(160));
    settle(&mut ac);

    assert_eq!(*queries.lock(), vec!["cou".to_string()]);
    assert_eq!(ac.suggestions(), ["country".to_string()]);
    assert!(ac.is_open());
}

#[test]
fn test_stale_results_never_overwrite_newer_ones() {
    init_tracing();
    let rt = runtime();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(|query: String| async move {
                let delay = if query == "a" { 200 } else { 10 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, ProviderError>(vec![format!("result for {query}")])
            }))
            .with_runtime(rt.handle().clone()),
    );

    ac.lookup("a".into());
    ac.lookup("ab".into());
    assert_eq!(ac.pending_lookups(), 2);

    settle(&mut ac);
    assert_eq!(ac.suggestions(), ["result for ab".to_string()]);
}

#[test]
fn test_commit_discards_in_flight_lookup() {
    init_tracing();
    let rt = runtime();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(|query: String| async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, ProviderError>(vec![format!("{query}-late")])
            }))
            .with_runtime(rt.handle().clone()),
    );

    ac.suggest(vec!["Lima".to_string(), "Quito".to_string()]);
    ac.lookup("li".into());
    ac.handle_event(InputEvent::RowClicked(0));
    assert_eq!(ac.value(), "Lima");

    settle(&mut ac);
    assert!(ac.suggestions().is_empty());
    assert_eq!(ac.state(), NavigationState::Closed);
}

#[test]
fn test_provider_error_yields_empty_closed_list() {
    init_tracing();
    let rt = runtime();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(|_query: String| async move {
                Err::<Vec<String>, ProviderError>("service unavailable".into())
            }))
            .with_runtime(rt.handle().clone()),
    );

    ac.suggest(vec!["previous".to_string()]);
    assert!(ac.is_open());

    ac.lookup("x".into());
    settle(&mut ac);
    assert!(ac.suggestions().is_empty());
    assert!(!ac.is_open());
}

#[test]
fn test_provider_panic_is_contained() {
    init_tracing();
    let rt = runtime();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(|query: String| async move {
                if query == "boom" {
                    panic!("provider bug");
                }
                Ok::<_, ProviderError>(vec![query])
            }))
            .with_runtime(rt.handle().clone()),
    );

    ac.lookup("boom".into());
    settle(&mut ac);
    assert!(ac.suggestions().is_empty());

    ac.lookup("fine".into());
    settle(&mut ac);
    assert_eq!(ac.suggestions(), ["fine".to_string()]);
}

#[test]
fn test_provider_results_are_truncated() {
    init_tracing();
    let rt = runtime();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(|query: String| async move {
                Ok::<_, ProviderError>((0..20).map(|i| format!("{query}{i}")).collect::<Vec<String>>())
            }))
            .with_max_viewable_items(5)
            .with_runtime(rt.handle().clone()),
    );

    ac.lookup("n".into());
    settle(&mut ac);
    assert_eq!(ac.suggestions().len(), 5);
    assert_eq!(ac.suggestions()[4], "n4");
}

#[test]
fn test_wake_handler_called_when_result_ready() {
    init_tracing();
    let rt = runtime();
    let woken = Arc::new(AtomicBool::new(false));
    let flag = woken.clone();

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_provider(provider_fn(|query: String| async move {
                Ok::<_, ProviderError>(vec![query])
            }))
            .with_runtime(rt.handle().clone()),
    );
    ac.set_wake_handler(move || flag.store(true, Ordering::SeqCst));

    ac.lookup("wake".into());
    settle(&mut ac);

    // The handler runs right after the result is queued.
    let deadline = Instant::now() + WAIT;
    while !woken.load(Ordering::SeqCst) && Instant::now() < deadline {
        std::thread::sleep(ms(5));
    }
    assert!(woken.load(Ordering::SeqCst));
}

#[test]
fn test_keyboard_navigation_does_not_wrap() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_items(vec!["Lima".to_string(), "Linz".to_string(), "Lille".to_string()]),
    );
    let highlighted = Arc::new(Mutex::new(Vec::new()));
    let seen = highlighted.clone();
    ac.highlighted.connect(move |item| seen.lock().push(item.clone()));

    let start = Instant::now();
    type_keys(&mut ac, "li", start);
    ac.tick_at(start + ms(100));
    assert_eq!(ac.state(), NavigationState::Open);
    assert_eq!(ac.highlight_index(), -1);

    for _ in 0..5 {
        ac.handle_event_at(InputEvent::key_up(Key::ArrowDown, "li"), start);
    }
    assert_eq!(ac.highlighted_index(), Some(2));

    for _ in 0..5 {
        ac.handle_event_at(InputEvent::key_up(Key::ArrowUp, "li"), start);
    }
    assert_eq!(ac.highlighted_index(), Some(0));
    assert!(ac.is_open());

    assert_eq!(
        *highlighted.lock(),
        vec!["Lima", "Linz", "Lille", "Linz", "Lima"]
    );
}

#[test]
fn test_arrows_do_not_trigger_lookup() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new().with_items(vec!["Lima".to_string()]),
    );
    let start = Instant::now();

    ac.handle_event_at(InputEvent::key_up(Key::ArrowDown, "li"), start);
    ac.handle_event_at(InputEvent::key_up(Key::Escape, "li"), start);
    assert!(!ac.has_pending_query());

    ac.tick_at(start + ms(200));
    assert!(ac.suggestions().is_empty());
    assert_eq!(ac.value(), "li");
}

#[test]
fn test_empty_query_closes_list() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new().with_items(vec!["Lima".to_string()]),
    );
    let start = Instant::now();

    type_keys(&mut ac, "l", start);
    ac.tick_at(start + ms(100));
    assert!(ac.is_open());

    ac.handle_event_at(InputEvent::key_up(Key::Backspace, ""), start + ms(200));
    ac.tick_at(start + ms(300));
    assert!(ac.suggestions().is_empty());
    assert!(!ac.is_open());
}

#[test]
fn test_commit_sets_value_from_text_expression() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_items(vec![person("Ada", "London"), person("Alan", "Wilmslow")])
            .with_text_expression("address.city")
            .with_highlight_first(true),
    );
    let committed = Arc::new(Mutex::new(None));
    let slot = committed.clone();
    ac.changed.connect(move |item: &Person| *slot.lock() = Some(item.clone()));

    let start = Instant::now();
    ac.handle_event_at(InputEvent::key_up(Key::Character('w'), "wilm"), start);
    ac.handle_event_at(InputEvent::key_up(Key::Enter, "wilm"), start + ms(10));
    assert_eq!(ac.suggestions().len(), 1);

    ac.handle_event_at(InputEvent::key_up(Key::Enter, "wilm"), start + ms(20));
    assert_eq!(ac.value(), "Wilmslow");
    assert_eq!(ac.selected_item(), Some(&person("Alan", "Wilmslow")));
    assert_eq!(committed.lock().as_ref().map(|p| p.name.as_str()), Some("Alan"));
}

#[test]
fn test_custom_resolver_wins_over_expression() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_items(vec![person("Grace", "Arlington")])
            .with_text_expression("address.city")
            .with_text_resolver(|p: &Person| Some(p.name.to_uppercase())),
    );

    ac.lookup("grace".into());
    assert_eq!(ac.suggestions().len(), 1);
    assert_eq!(ac.item_text(&ac.suggestions()[0]), "GRACE");

    ac.set_text_resolver(None);
    assert_eq!(ac.item_text(&ac.suggestions()[0]), "Arlington");
}

#[test]
fn test_rows_mark_selection_and_highlight() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_items(vec!["Oslo".to_string(), "Osaka".to_string()])
            .with_seed(SuggestionIdSeed::new("city")),
    );
    ac.lookup("os".into());
    ac.commit("Osaka".to_string());

    ac.lookup("os".into());
    ac.handle_event(InputEvent::key_up(Key::ArrowDown, "os"));

    let rows = ac.render_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "city-0");
    assert!(rows[0].highlighted);
    assert!(!rows[0].selected);
    assert_eq!(rows[1].id, "city-1");
    assert!(rows[1].selected);
    assert!(!rows[1].highlighted);
}

#[test]
fn test_custom_row_renderer() {
    let renderer = render_fn(|row: &RowContext<'_, String>| {
        let marker = if row.highlighted { '>' } else { ' ' };
        format!("{marker}{}", row.label)
    });
    let mut ac = Autocomplete::with_renderer(
        AutocompleteConfig::new()
            .with_items(vec!["Bern".to_string(), "Berlin".to_string()])
            .with_highlight_first(true),
        renderer,
    );

    ac.lookup("ber".into());
    assert_eq!(ac.render_rows(), vec![">Bern".to_string(), " Berlin".to_string()]);
}

#[test]
fn test_rendered_row_commit_event() {
    let renderer = render_fn(|row: &RowContext<'_, String>| (row.label.to_owned(), row.commit_event()));
    let mut ac = Autocomplete::with_renderer(
        AutocompleteConfig::new().with_items(vec!["Bern".to_string(), "Berlin".to_string()]),
        renderer,
    );

    ac.lookup("ber".into());
    let rows = ac.render_rows();
    let (label, on_click) = rows[1].clone();
    assert_eq!(label, "Berlin");

    assert!(ac.handle_event(on_click));
    assert_eq!(ac.value(), "Berlin");
    assert!(!ac.is_open());
}

#[test]
fn test_suggestion_ids_are_unique_per_instance() {
    let a: Autocomplete<String> = Autocomplete::new(AutocompleteConfig::new());
    let b: Autocomplete<String> = Autocomplete::new(AutocompleteConfig::new());
    assert_ne!(a.suggestion_id(0), b.suggestion_id(0));
    assert_eq!(a.suggestion_id(3), format!("{}-3", a.seed()));
}

#[test]
fn test_pointer_leave_grace_close() {
    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_items(vec!["Rome".to_string()])
            .with_close_grace(ms(300)),
    );
    let opened = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicUsize::new(0));
    let (o, c) = (opened.clone(), closed.clone());
    ac.opened_changed.connect(move |&open| {
        if open {
            o.fetch_add(1, Ordering::SeqCst);
        } else {
            c.fetch_add(1, Ordering::SeqCst);
        }
    });

    let start = Instant::now();
    ac.handle_event_at(InputEvent::Focus, start);
    ac.lookup("ro".into());
    ac.handle_event_at(InputEvent::PointerEnter, start);
    ac.handle_event_at(InputEvent::Blur, start);
    assert!(ac.is_open());

    ac.handle_event_at(InputEvent::PointerLeave, start + ms(50));
    ac.handle_event_at(InputEvent::PointerEnter, start + ms(100));
    ac.tick_at(start + ms(400));
    assert!(ac.is_open(), "pointer came back before the grace period ended");

    ac.handle_event_at(InputEvent::PointerLeave, start + ms(500));
    ac.tick_at(start + ms(800));
    assert!(!ac.is_open());
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_options_from_toml_drive_widget() {
    let options = AutocompleteOptions::from_toml_str(
        r#"
        max-viewable-items = 2
        highlight-first = true
        debounce-ms = 40
        "#,
    )
    .expect("valid options");

    let mut ac = Autocomplete::new(
        AutocompleteConfig::new()
            .with_options(options)
            .with_items(vec!["Pisa".to_string(), "Paris".to_string(), "Porto".to_string()]),
    );

    let start = Instant::now();
    type_keys(&mut ac, "p", start);
    ac.tick_at(start + ms(40));
    assert_eq!(ac.suggestions(), ["Pisa".to_string(), "Paris".to_string()]);
    assert_eq!(ac.state(), NavigationState::Highlighted(0));
}
