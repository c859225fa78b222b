//! Event bus, completion notifications, and audit-log persistence.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`notify`]: the [`NotificationSink`] seam with log and email sinks.
//! - [`UserLogPersistence`]: background subscriber writing user-scoped
//!   events to the `user_logs` table.

pub mod audit;
pub mod bus;
pub mod notify;

pub use audit::UserLogPersistence;
pub use bus::{EventBus, PlatformEvent};
pub use notify::{EmailConfig, EmailNotifier, LogNotifier, NotificationSink, NotifyError};
