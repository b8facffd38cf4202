//! Core systems for Horizon Autocomplete.
//!
//! This crate provides the foundations the autocomplete widget is built on:
//!
//! - **Signal/Slot System**: Type-safe change notifications
//! - **Timers**: One-shot timers carrying deferred actions, driven by the host
//! - **Async Runtime**: Tokio runtime used to run asynchronous item providers
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_autocomplete_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use horizon_autocomplete_core::TimerManager;
//! use std::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut timers = TimerManager::new();
//! timers.start_one_shot(start, Duration::from_millis(100), "lookup");
//!
//! assert!(timers.process_expired(start).is_empty());
//! assert_eq!(timers.process_expired(start + Duration::from_millis(100)).len(), 1);
//! ```

pub mod async_runtime;
mod error;
pub mod logging;
pub mod signal;
mod timer;

pub use async_runtime::{AsyncRuntime, AsyncRuntimeConfig};
pub use error::{AsyncRuntimeError, CoreError, Result, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerManager};
