//! Command dispatch and completion detection.
//!
//! A command is written once, then the driver polls the channel and tests
//! the accumulated output against a completion pattern: either the
//! freshly discovered prompt (escaped literal) or a caller-supplied
//! expression. Two budget policies share one poll skeleton: wall-clock
//! bounded by the session's read timeout, or a fixed iteration count for
//! call sites that specify an explicit loop budget.

use std::time::{Duration, Instant};

use log::{debug, trace};
use regex::Regex;
use tokio::time::sleep;

use super::{POLL_INTERVAL, Session, sanitize};
use crate::channel::Channel;
use crate::error::{Error, Result};

/// Per-call options for [`Session::send_command_with`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Completion pattern override. When absent, the discovered (or
    /// cached) prompt is escaped and used instead.
    pub expect_pattern: Option<String>,

    /// Timing scale for this call; resolved against the device class.
    pub delay_factor: Option<f64>,

    /// Switch to the bounded-iteration variant with this loop budget.
    /// `None` selects the wall-clock variant.
    pub max_loops: Option<u64>,

    /// Rediscover the prompt before sending when no expect pattern is
    /// supplied. When false, the last known prompt is used.
    pub auto_find_prompt: bool,

    /// Remove the trailing prompt from the result.
    pub strip_prompt: bool,

    /// Remove the echoed command from the result.
    pub strip_command: bool,

    /// Ensure the command ends with the canonical line terminator
    /// before sending.
    pub normalize: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            expect_pattern: None,
            delay_factor: None,
            max_loops: None,
            auto_find_prompt: true,
            strip_prompt: true,
            strip_command: true,
            normalize: true,
        }
    }
}

impl SendOptions {
    pub fn expect_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.expect_pattern = Some(pattern.into());
        self
    }

    pub fn delay_factor(mut self, factor: f64) -> Self {
        self.delay_factor = Some(factor);
        self
    }

    pub fn max_loops(mut self, loops: u64) -> Self {
        self.max_loops = Some(loops);
        self
    }

    pub fn auto_find_prompt(mut self, enabled: bool) -> Self {
        self.auto_find_prompt = enabled;
        self
    }

    pub fn strip_prompt(mut self, enabled: bool) -> Self {
        self.strip_prompt = enabled;
        self
    }

    pub fn strip_command(mut self, enabled: bool) -> Self {
        self.strip_command = enabled;
        self
    }

    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }
}

/// Exit condition for one poll loop.
enum Budget {
    WallClock(Duration),
    Loops(u64),
}

impl Budget {
    fn exhausted(&self, started: Instant, iterations: u64) -> bool {
        match self {
            Budget::WallClock(ceiling) => started.elapsed() >= *ceiling,
            Budget::Loops(max) => iterations >= *max,
        }
    }
}

impl<C: Channel> Session<C> {
    /// Send a command and wait for its output to complete.
    ///
    /// Equivalent to [`send_command_with`](Session::send_command_with)
    /// with default options: prompt auto-discovery, wall-clock budget,
    /// echo and trailing prompt stripped.
    pub async fn send_command(&mut self, command: &str) -> Result<String> {
        self.send_command_with(command, SendOptions::default()).await
    }

    /// Send a command with explicit options.
    ///
    /// The command bytes are written exactly once; the only re-issuance
    /// is the bare line feed sent when the device paginates a large
    /// response behind its "large output" banner. Fails with
    /// [`Error::PatternNotFound`] carrying the accumulated partial
    /// output when the budget is exhausted on a live channel, and with
    /// [`Error::SessionTerminated`] when the channel dies mid-wait.
    pub async fn send_command_with(&mut self, command: &str, opts: SendOptions) -> Result<String> {
        let factor = self.delay_factor(opts.delay_factor);
        let interval = POLL_INTERVAL.mul_f64(factor);
        let pattern = self.resolve_completion_pattern(&opts).await?;
        let normalizer = self.normalizer();
        let separator = self.profile.line_separator.clone();

        let wire = if opts.normalize {
            format!("{}{}", command.trim_end(), separator)
        } else {
            command.to_string()
        };

        self.channel.clear_buffer().await?;
        self.channel.write(wire.as_bytes()).await?;
        debug!("command sent: {:?}", command);

        let budget = match opts.max_loops {
            Some(loops) => Budget::Loops(loops),
            None => Budget::WallClock(self.config.max_read_timeout),
        };

        let started = Instant::now();
        let mut iterations: u64 = 0;
        let mut buffer = String::new();
        let mut normalized = String::new();
        let mut pages_flushed = 0usize;
        let mut matched = false;

        while !budget.exhausted(started, iterations) {
            if !self.channel.is_alive() {
                break;
            }
            iterations += 1;

            let chunk = self.channel.read_available().await?;
            if chunk.is_empty() {
                sleep(interval).await;
                continue;
            }

            buffer.push_str(&String::from_utf8_lossy(&chunk));
            normalized = normalizer.normalize(&buffer, Some(&pattern));
            trace!(
                "poll {}: {} bytes accumulated",
                iterations,
                normalized.len()
            );

            // A "large output" banner means the device split the response
            // behind an intermediate status line; one bare line feed per
            // occurrence flushes the next page. Self-healing, not an error.
            if let Some(marker) = &self.profile.large_output_marker {
                let seen = normalized.to_lowercase().matches(&marker.to_lowercase()).count();
                if seen > pages_flushed {
                    pages_flushed = seen;
                    debug!("large-output banner detected, flushing next page");
                    self.channel.write(separator.as_bytes()).await?;
                }
            }

            if pattern.is_match(&normalized) {
                matched = true;
                break;
            }
        }

        if matched {
            let mut output = normalized;
            if opts.strip_command {
                output = sanitize::strip_command_echo(&output, command, &separator);
            }
            if opts.strip_prompt {
                output = sanitize::strip_trailing_prompt(&output, &pattern, &separator);
            }
            return Ok(output);
        }

        if !self.channel.is_alive() {
            Err(Error::SessionTerminated)
        } else {
            // Partial output rides along for diagnostics.
            Err(Error::PatternNotFound {
                pattern: pattern.as_str().to_string(),
                output: normalized,
            })
        }
    }

    /// Pick the completion pattern for one call.
    ///
    /// Caller-supplied expressions are used verbatim; otherwise the
    /// prompt (rediscovered or cached) is escaped into a literal match.
    /// The chosen pattern never changes mid-call.
    async fn resolve_completion_pattern(&mut self, opts: &SendOptions) -> Result<Regex> {
        if let Some(expr) = &opts.expect_pattern {
            return Ok(Regex::new(expr)?);
        }

        let prompt = if opts.auto_find_prompt {
            self.find_prompt_with(opts.delay_factor.unwrap_or(1.0))
                .await
                .map_err(|e| Error::PromptDiscovery {
                    source: Box::new(e),
                })?
        } else {
            self.last_known_prompt().map(str::to_string).ok_or_else(|| {
                Error::PromptDiscovery {
                    source: Box::new(Error::PromptNotFound {
                        waited: Duration::ZERO,
                    }),
                }
            })?
        };

        Ok(Regex::new(&regex::escape(&prompt))?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::channel::scripted::ScriptedChannel;
    use crate::error::Error;
    use crate::platform::{DeviceProfile, ProfileRegistry};
    use crate::session::{SendOptions, Session, SessionConfig};

    fn fast_config() -> SessionConfig {
        SessionConfig {
            max_read_timeout: Duration::from_millis(200),
            global_delay_factor: 0.01,
            ansi_escape_handling: true,
        }
    }

    fn session(channel: ScriptedChannel) -> Session<ScriptedChannel> {
        Session::with_config(channel, DeviceProfile::new("generic"), fast_config())
    }

    #[tokio::test]
    async fn strips_echo_and_prompt_end_to_end() {
        // Write 1 provokes the prompt; write 2 is the command itself.
        let channel = ScriptedChannel::new([
            (1, "\r\nrouter#"),
            (2, "show version\r\nCisco IOS XR Software, Version 6.5.1\r\nrouter#"),
        ]);
        let mut session = session(channel);

        let output = session.send_command("show version").await.unwrap();
        assert_eq!(output, "Cisco IOS XR Software, Version 6.5.1");
    }

    #[tokio::test]
    async fn keeps_echo_and_prompt_when_stripping_disabled() {
        let channel = ScriptedChannel::new([
            (1, "show clock\r\n12:00:00 UTC\r\nrouter#"),
        ]);
        let mut session = session(channel);

        let opts = SendOptions::default()
            .expect_pattern(regex::escape("router#"))
            .strip_command(false)
            .strip_prompt(false);
        let output = session.send_command_with("show clock", opts).await.unwrap();
        assert_eq!(output, "show clock\n12:00:00 UTC\nrouter#");
    }

    #[tokio::test]
    async fn expect_pattern_overrides_prompt_discovery() {
        let channel = ScriptedChannel::new([(1, "dir flash:\r\nDestination filename?")]);
        let mut session = session(channel);

        let opts = SendOptions::default()
            .expect_pattern(r"filename\?")
            .strip_prompt(false);
        let output = session.send_command_with("dir flash:", opts).await.unwrap();
        // No prompt was ever discovered; only one write happened.
        assert_eq!(session.channel().writes.len(), 1);
        assert!(output.contains("Destination filename?"));
    }

    #[tokio::test]
    async fn no_reads_issued_after_pattern_match() {
        let channel = ScriptedChannel::new([(1, "show clock\r\n12:00:00 UTC\r\nrouter#")]);
        let mut session = session(channel);

        let opts = SendOptions::default().expect_pattern(regex::escape("router#"));
        session.send_command_with("show clock", opts).await.unwrap();
        assert_eq!(session.channel().reads_after_script, 0);
    }

    #[tokio::test]
    async fn cached_prompt_used_when_auto_discovery_disabled() {
        let channel = ScriptedChannel::new([
            (1, "\r\nrouter#"),
            (2, "show users\r\nadmin console\r\nrouter#"),
        ]);
        let mut session = session(channel);
        session.find_prompt().await.unwrap();

        let opts = SendOptions::default().auto_find_prompt(false);
        let output = session.send_command_with("show users", opts).await.unwrap();
        assert_eq!(output, "admin console");
    }

    #[tokio::test]
    async fn missing_prompt_without_discovery_is_an_error() {
        let mut session = session(ScriptedChannel::silent());

        let opts = SendOptions::default().auto_find_prompt(false);
        let err = session.send_command_with("show users", opts).await.unwrap_err();
        assert!(matches!(err, Error::PromptDiscovery { .. }));
    }

    #[tokio::test]
    async fn failed_discovery_propagates_before_sending() {
        let mut session = session(ScriptedChannel::silent());

        let err = session.send_command("show version").await.unwrap_err();
        assert!(matches!(err, Error::PromptDiscovery { .. }));
        // The command itself was never written, only the prompt probe.
        assert_eq!(session.channel().written(), b"\n");
    }

    #[tokio::test]
    async fn bounded_variant_exhausts_with_partial_output() {
        let channel = ScriptedChannel::new([(1, "partial response, no prompt yet")]);
        let mut session = session(channel);

        let opts = SendOptions::default()
            .expect_pattern(regex::escape("router#"))
            .max_loops(5);
        let err = session.send_command_with("show tech", opts).await.unwrap_err();
        match err {
            Error::PatternNotFound { output, .. } => {
                assert!(output.contains("partial response"));
            }
            other => panic!("expected PatternNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dead_channel_mid_command_reports_session_terminated() {
        let channel = ScriptedChannel::silent().die_after_reads(2);
        let mut session = session(channel);

        let opts = SendOptions::default().expect_pattern(regex::escape("router#"));
        let err = session.send_command_with("show clock", opts).await.unwrap_err();
        assert!(matches!(err, Error::SessionTerminated));
    }

    #[tokio::test]
    async fn large_output_banner_triggers_exactly_one_continuation() {
        let channel = ScriptedChannel::new([
            (
                1,
                "show running-config\r\nBuilding configuration...\r\n\
                 This could be a few minutes if your config is large\r\n",
            ),
            // Next page only arrives after the continuation line feed.
            (2, "interface GigabitEthernet0/0/0/0\r\nrouter#"),
        ]);
        let profile = ProfileRegistry::resolve("cisco_xr");
        let mut session = Session::with_config(channel, profile, fast_config());

        let opts = SendOptions::default().expect_pattern(regex::escape("router#"));
        let output = session
            .send_command_with("show running-config", opts)
            .await
            .unwrap();

        assert!(output.contains("interface GigabitEthernet0/0/0/0"));
        // Exactly two writes: the command and one continuation line feed.
        assert_eq!(session.channel().writes.len(), 2);
        assert_eq!(session.channel().writes[1], b"\n");
    }

    #[tokio::test]
    async fn backspace_repainted_echo_is_stripped() {
        let channel = ScriptedChannel::new([
            (1, "show ver\x08\x08sh ver\r\nCisco IOS XR\r\nrouter#"),
        ]);
        let mut session = session(channel);

        let opts = SendOptions::default().expect_pattern(regex::escape("router#"));
        let output = session.send_command_with("show ver", opts).await.unwrap();
        assert_eq!(output, "Cisco IOS XR");
    }
}
