//! Connection state machine with exponential backoff.
//!
//! ```text
//! Disconnected --begin--> Connecting --open--> Connected
//!      ^                      |                    |
//!      |                    close                close
//!      +-----retry due--------+--------------------+
//!                     (attempts exhausted: GaveUp)
//! ```
//!
//! The machine is pure. It never sleeps; the driver owns the timers and
//! feeds their expiry back in.

use std::time::Duration;

/// Backoff and grace settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry. Doubles for every failed attempt.
    pub initial_delay: Duration,
    /// Retries allowed before giving up.
    pub max_attempts: u32,
    /// How long a drop may last before it is reported.
    pub grace: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            max_attempts: 5,
            grace: Duration::from_millis(500),
        }
    }
}

impl ReconnectPolicy {
    /// `initial_delay × 2^attempt`, saturating.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

/// Where the connection currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    GaveUp,
}

/// What to do after a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Arm the retry timer.
    RetryAfter(Duration),
    /// Attempts are exhausted.
    GaveUp,
    /// The close did not concern a live connection.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempts: u32,
}

impl ReconnectMachine {
    pub const fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            attempts: 0,
        }
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Starts the first connection. Returns `true` if a connect should be
    /// attempted now.
    pub fn begin(&mut self) -> bool {
        if self.state == ConnectionState::Disconnected {
            self.state = ConnectionState::Connecting;
            true
        } else {
            false
        }
    }

    /// The transport opened.
    pub fn on_open(&mut self) {
        self.state = ConnectionState::Connected;
        self.attempts = 0;
    }

    /// The transport closed, or a connect attempt failed.
    pub fn on_close(&mut self) -> CloseOutcome {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                if self.attempts < self.policy.max_attempts {
                    self.state = ConnectionState::Disconnected;
                    CloseOutcome::RetryAfter(self.policy.delay_for(self.attempts))
                } else {
                    self.state = ConnectionState::GaveUp;
                    CloseOutcome::GaveUp
                }
            }
            ConnectionState::Disconnected | ConnectionState::GaveUp => CloseOutcome::Ignored,
        }
    }

    /// The retry timer fired. Returns `true` if a connect should be
    /// attempted now.
    pub fn on_retry_due(&mut self) -> bool {
        if self.state == ConnectionState::Disconnected {
            self.attempts += 1;
            self.state = ConnectionState::Connecting;
            true
        } else {
            false
        }
    }

    /// Leaves `GaveUp` so a manual reconnect can start over.
    pub fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn default_policy() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.initial_delay, ms(1000));
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.grace, ms(500));
    }

    #[test]
    fn delays_double() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<_> = (0..5).map(|a| policy.delay_for(a)).collect();
        assert_eq!(delays, [ms(1000), ms(2000), ms(4000), ms(8000), ms(16000)]);
    }

    #[test]
    fn huge_attempt_saturates() {
        let policy = ReconnectPolicy::default();
        assert!(policy.delay_for(64) >= policy.delay_for(31));
    }

    #[test]
    fn backs_off_then_gives_up() {
        let mut machine = ReconnectMachine::new(ReconnectPolicy::default());
        assert!(machine.begin());
        assert_eq!(machine.state(), ConnectionState::Connecting);

        let mut delays = Vec::new();
        loop {
            match machine.on_close() {
                CloseOutcome::RetryAfter(delay) => {
                    delays.push(delay);
                    assert_eq!(machine.state(), ConnectionState::Disconnected);
                    assert!(machine.on_retry_due());
                }
                CloseOutcome::GaveUp => break,
                CloseOutcome::Ignored => panic!("close while connecting must count"),
            }
        }
        assert_eq!(delays, [ms(1000), ms(2000), ms(4000), ms(8000), ms(16000)]);
        assert_eq!(machine.state(), ConnectionState::GaveUp);
        assert_eq!(machine.attempts(), 5);
        assert!(!machine.on_retry_due());
        assert_eq!(machine.on_close(), CloseOutcome::Ignored);
    }

    #[test]
    fn open_resets_attempts() {
        let mut machine = ReconnectMachine::new(ReconnectPolicy::default());
        machine.begin();
        machine.on_close();
        machine.on_retry_due();
        machine.on_close();
        machine.on_retry_due();
        assert_eq!(machine.attempts(), 2);

        machine.on_open();
        assert_eq!(machine.state(), ConnectionState::Connected);
        assert_eq!(machine.attempts(), 0);
        assert_eq!(machine.on_close(), CloseOutcome::RetryAfter(ms(1000)));
    }

    #[test]
    fn zero_attempts_gives_up_on_first_close() {
        let mut machine = ReconnectMachine::new(ReconnectPolicy {
            max_attempts: 0,
            ..ReconnectPolicy::default()
        });
        machine.begin();
        assert_eq!(machine.on_close(), CloseOutcome::GaveUp);
    }

    #[test]
    fn reset_after_giving_up() {
        let mut machine = ReconnectMachine::new(ReconnectPolicy {
            max_attempts: 0,
            ..ReconnectPolicy::default()
        });
        machine.begin();
        machine.on_close();
        machine.reset();
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert!(machine.begin());
    }

    #[test]
    fn begin_is_only_valid_when_disconnected() {
        let mut machine = ReconnectMachine::new(ReconnectPolicy::default());
        assert!(machine.begin());
        assert!(!machine.begin());
    }
}
