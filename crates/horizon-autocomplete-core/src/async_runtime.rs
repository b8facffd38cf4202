//! Tokio runtime for item providers.
//!
//! Widgets never await on the UI thread. Provider futures are spawned here
//! and their output is handed to a callback on a runtime thread, which
//! forwards it over a channel the widget drains when the host pumps it.
//!
//! Hosts that already run Tokio pass their own [`Handle`] and use
//! [`spawn_with_callback_on`]; everyone else gets a lazily created
//! [`AsyncRuntime::try_global`].
//!
//! ```
//! use horizon_autocomplete_core::{AsyncRuntime, AsyncRuntimeConfig};
//!
//! let runtime = AsyncRuntime::new(AsyncRuntimeConfig::new().with_worker_threads(1)).unwrap();
//! let (tx, rx) = crossbeam_channel::bounded(1);
//! runtime.spawn_with_callback(async { 40 + 2 }, move |answer| {
//!     let _ = tx.send(answer);
//! });
//! assert_eq!(rx.recv().unwrap(), 42);
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::AsyncRuntimeError;
use crate::logging::targets;

static GLOBAL_RUNTIME: OnceLock<AsyncRuntime> = OnceLock::new();

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for an [`AsyncRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncRuntimeConfig {
    /// Worker thread count; `None` uses Tokio's default (one per core).
    pub worker_threads: Option<usize>,
    /// Name given to worker threads.
    pub thread_name: String,
}

impl Default for AsyncRuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "horizon-autocomplete".to_string(),
        }
    }
}

impl AsyncRuntimeConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads (clamped to at least 1).
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count.max(1));
        self
    }

    /// Set the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A multi-threaded Tokio runtime running provider lookups.
pub struct AsyncRuntime {
    runtime: Runtime,
    active_tasks: Arc<AtomicU64>,
}

impl AsyncRuntime {
    /// The process-wide runtime, created with default settings on first use.
    pub fn try_global() -> Result<&'static AsyncRuntime, AsyncRuntimeError> {
        if let Some(runtime) = GLOBAL_RUNTIME.get() {
            return Ok(runtime);
        }
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default())?;
        // A concurrent initializer may have won; the loser is dropped here.
        Ok(GLOBAL_RUNTIME.get_or_init(|| runtime))
    }

    /// Install the process-wide runtime with custom settings.
    ///
    /// Fails if it was already created, explicitly or by [`try_global`](Self::try_global).
    pub fn init_global(
        config: AsyncRuntimeConfig,
    ) -> Result<&'static AsyncRuntime, AsyncRuntimeError> {
        let runtime = AsyncRuntime::new(config)?;
        GLOBAL_RUNTIME
            .set(runtime)
            .map_err(|_| AsyncRuntimeError::AlreadyInitialized)?;
        GLOBAL_RUNTIME
            .get()
            .ok_or(AsyncRuntimeError::AlreadyInitialized)
    }

    /// Build a runtime.
    pub fn new(config: AsyncRuntimeConfig) -> Result<Self, AsyncRuntimeError> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(&config.thread_name).enable_time();
        if let Some(workers) = config.worker_threads {
            builder.worker_threads(workers);
        }

        let runtime = builder
            .build()
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;

        tracing::debug!(
            target: targets::RUNTIME,
            thread_name = %config.thread_name,
            workers = ?config.worker_threads,
            "provider runtime started"
        );

        Ok(Self {
            runtime,
            active_tasks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// The Tokio handle, for passing to widgets.
    pub fn handle(&self) -> &Handle {
        self.runtime.handle()
    }

    /// Tasks spawned through [`spawn_with_callback`](Self::spawn_with_callback)
    /// that have not finished yet.
    pub fn active_tasks(&self) -> u64 {
        self.active_tasks.load(Ordering::Acquire)
    }

    /// Run `future` and hand its output to `callback` on a runtime thread.
    pub fn spawn_with_callback<F, T, C>(&self, future: F, callback: C)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        spawn_with_callback_on(
            self.handle(),
            future,
            callback,
            Some(self.active_tasks.clone()),
        );
    }

    /// Stop the runtime, giving running lookups a moment to finish.
    pub fn shutdown(self) {
        tracing::debug!(target: targets::RUNTIME, active = self.active_tasks(), "provider runtime shutting down");
        self.runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    }
}

/// Run `future` on `handle` and hand its output to `callback` on a runtime
/// thread. `active_tasks`, when given, counts the task while it runs.
pub fn spawn_with_callback_on<F, T, C>(
    handle: &Handle,
    future: F,
    callback: C,
    active_tasks: Option<Arc<AtomicU64>>,
) where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
    C: FnOnce(T) + Send + 'static,
{
    if let Some(counter) = &active_tasks {
        counter.fetch_add(1, Ordering::AcqRel);
    }

    handle.spawn(async move {
        let output = future.await;
        callback(output);
        if let Some(counter) = active_tasks {
            counter.fetch_sub(1, Ordering::AcqRel);
        }
    });
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}
