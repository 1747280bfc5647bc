//! Prompt discovery.
//!
//! A device signals readiness by printing a prompt, but the channel gives
//! no framing: the detector provokes output with a bare line separator
//! and polls until the trailing line stabilizes. Known banner classes
//! (post-login notices, autocommand execution, failover messages) are
//! given extra settle time because they are followed by more
//! device-generated text before the real prompt appears.

use std::time::Instant;

use log::{debug, trace};
use tokio::time::sleep;

use super::{POLL_INTERVAL, Session};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::normalize::strip_null_markers;

impl<C: Channel> Session<C> {
    /// Discover the device's current prompt, last line only.
    ///
    /// Caches the result as the session's last known prompt and leaves
    /// the channel drained. Fails with [`Error::PromptNotFound`] if the
    /// read timeout elapses on a live but silent channel, and with
    /// [`Error::SessionTerminated`] if the channel dies while waiting.
    pub async fn find_prompt(&mut self) -> Result<String> {
        self.find_prompt_with(1.0).await
    }

    /// [`find_prompt`](Session::find_prompt) with an explicit delay factor.
    pub async fn find_prompt_with(&mut self, delay_factor: f64) -> Result<String> {
        let factor = self.delay_factor(Some(delay_factor));
        let interval = POLL_INTERVAL.mul_f64(factor);
        let normalizer = self.normalizer();
        let separator = self.profile.line_separator.clone();

        // Start clean, then provoke a fresh prompt.
        self.channel.clear_buffer().await?;
        self.channel.write(separator.as_bytes()).await?;

        let started = Instant::now();
        let mut buffer = String::new();
        let mut settled = vec![false; self.profile.banner_rules.len()];

        while started.elapsed() < self.config.max_read_timeout {
            if !self.channel.is_alive() {
                return Err(Error::SessionTerminated);
            }

            let chunk = self.channel.read_available().await?;
            if chunk.is_empty() {
                // A quiet poll one full interval after data means the
                // trailing line is stable.
                if !buffer.trim().is_empty() {
                    let normalized = normalizer.normalize(&buffer, None);
                    let prompt = normalized
                        .trim()
                        .rsplit(separator.as_str())
                        .next()
                        .unwrap_or("")
                        .trim()
                        .to_string();
                    if !prompt.is_empty() {
                        debug!("prompt discovered: {prompt:?}");
                        self.cache_prompt(&prompt);
                        self.channel.clear_buffer().await?;
                        return Ok(prompt);
                    }
                }
                sleep(interval).await;
                continue;
            }

            buffer.push_str(&strip_null_markers(&String::from_utf8_lossy(&chunk)));
            trace!("prompt poll: {} bytes buffered", buffer.len());

            // Banners are asynchronous and variable-length; one fixed delay
            // cannot cover all classes, so each known class provisions its
            // own settle offset, once per call.
            for i in 0..self.profile.banner_rules.len() {
                if settled[i] || !self.profile.banner_rules[i].matches(&buffer) {
                    continue;
                }
                settled[i] = true;
                let rule = self.profile.banner_rules[i].clone();
                debug!("banner {:?} detected, settling for {:?}", rule.marker, rule.settle);
                sleep(rule.settle.mul_f64(factor)).await;
                let more = self.channel.read_available().await?;
                buffer.push_str(&strip_null_markers(&String::from_utf8_lossy(&more)));
            }

            // Prompts routinely arrive split across transport chunks, so
            // the decisive quiet poll must come a full interval after the
            // last data, never on an immediate re-read.
            sleep(interval).await;
        }

        if !self.channel.is_alive() {
            Err(Error::SessionTerminated)
        } else {
            Err(Error::PromptNotFound {
                waited: started.elapsed(),
            })
        }
    }
}
