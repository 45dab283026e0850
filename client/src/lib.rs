//! Client side of the scrawl shared canvas.
//!
//! A [`Replica`] keeps a local copy of the canvas in step with the server by
//! applying the same validated mutations. A [`ClientDriver`] connects it to a
//! server through any [`Connector`], retrying with exponential backoff.
//!
//! # Design Principles
//!
//! - **Same apply path** - Remote actions are applied with
//!   [`protocol::Mutation::apply`], exactly as on the server.
//! - **Snapshots win** - Every `init` replaces the local raster; only the
//!   stroke still being drawn is re-applied on top.
//! - **Pure state machine** - [`ReconnectMachine`] holds no timers; the
//!   driver owns them as [`timer::DeferredTask`]s.
//!
//! # Example
//!
//! ```
//! use client::{ReconnectMachine, ReconnectPolicy, CloseOutcome};
//! use std::time::Duration;
//!
//! let mut machine = ReconnectMachine::new(ReconnectPolicy::default());
//! machine.begin();
//! assert_eq!(machine.on_close(), CloseOutcome::RetryAfter(Duration::from_secs(1)));
//! ```

mod driver;
mod error;
mod reconnect;
mod replica;

pub use driver::{ClientCommand, ClientConfig, ClientDriver, ClientEvent, Connector, Transport};
pub use error::ClientError;
pub use reconnect::{CloseOutcome, ConnectionState, ReconnectMachine, ReconnectPolicy};
pub use replica::{Applied, Replica};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = ClientConfig::default();
        let _ = ReconnectPolicy::default();
        let _ = Replica::default();
        let _ = ConnectionState::Disconnected;
    }
}
