//! Single-slot deferred tasks.
//!
//! A [`DeferredTask`] holds at most one pending event and the deadline at
//! which it becomes due. The owner polls [`DeferredTask::expired`] from its
//! own `select!` loop, so an expiry is always observed on the owner's task
//! and never races a concurrent `cancel` or re-`arm`.
//!
//! # Design Principles
//!
//! - **One slot** - Arming replaces whatever was pending.
//! - **Idempotent cancel** - Cancelling an empty, fired or cancelled task is
//!   a no-op.
//! - **Cancel-safe waits** - Dropping an `expired()` future mid-wait leaves
//!   the task armed.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use timer::DeferredTask;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut save = DeferredTask::new();
//! save.arm(Duration::from_millis(5), "save");
//! save.arm(Duration::from_millis(10), "save again");
//!
//! assert_eq!(save.expired().await, "save again");
//! assert!(!save.is_armed());
//! # }
//! ```

mod deferred;

pub use deferred::DeferredTask;
