//! Interactive session engine: prompt discovery and command dispatch.
//!
//! A [`Session`] wraps one [`Channel`] for the lifetime of a connection.
//! All operations are blocking with respect to the caller but are
//! internally cooperative poll loops (read, test, sleep) bounded by the
//! session's read timeout. Every loop only awaits at iteration
//! boundaries, so dropping the returned future (e.g. under
//! `tokio::select!`) cancels cleanly between polls, never mid-read.
//!
//! One in-flight operation per session: callers needing concurrency use
//! one session per device connection.

mod command;
mod prompt;
pub mod sanitize;

pub use command::SendOptions;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::normalize::Normalizer;
use crate::platform::DeviceProfile;

/// Base interval between polls, scaled by the resolved delay factor.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Session-level tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hard ceiling for every wall-clock polling loop.
    ///
    /// No operation blocks past this without raising a timeout or
    /// terminated-session error. Never silently extended.
    pub max_read_timeout: Duration,

    /// Scales every sleep interval in the engine.
    pub global_delay_factor: f64,

    /// Strip ANSI/VT escape sequences from device output.
    pub ansi_escape_handling: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_read_timeout: Duration::from_secs(1800),
            global_delay_factor: 1.0,
            ansi_escape_handling: true,
        }
    }
}

/// Long-lived handle wrapping one channel to an interactive shell.
pub struct Session<C: Channel> {
    channel: C,
    profile: DeviceProfile,
    config: SessionConfig,
    last_known_prompt: Option<String>,
}

impl<C: Channel> Session<C> {
    /// Create a session over an established channel with default config.
    pub fn new(channel: C, profile: DeviceProfile) -> Self {
        Self::with_config(channel, profile, SessionConfig::default())
    }

    pub fn with_config(channel: C, profile: DeviceProfile, config: SessionConfig) -> Self {
        Self {
            channel,
            profile,
            config,
            last_known_prompt: None,
        }
    }

    /// The prompt cached by the most recent successful discovery.
    ///
    /// May be stale; overwritten on every successful [`find_prompt`]
    /// (and on auto-discovery inside [`send_command`]).
    ///
    /// [`find_prompt`]: Session::find_prompt
    /// [`send_command`]: Session::send_command
    pub fn last_known_prompt(&self) -> Option<&str> {
        self.last_known_prompt.as_deref()
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consume the session and hand the channel back to the caller.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Resolve the effective delay factor for one operation.
    ///
    /// The requested factor is first resolved against the device class,
    /// then scaled by the session-wide factor.
    pub(crate) fn delay_factor(&self, requested: Option<f64>) -> f64 {
        self.profile.select_delay_factor(requested.unwrap_or(1.0)) * self.config.global_delay_factor
    }

    pub(crate) fn normalizer(&self) -> Normalizer {
        Normalizer::new(
            self.config.ansi_escape_handling,
            self.profile.line_separator.clone(),
        )
    }

    pub(crate) fn cache_prompt(&mut self, prompt: &str) {
        self.last_known_prompt = Some(prompt.to_string());
    }
}
