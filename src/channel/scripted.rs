//! Scripted in-memory channel for tests.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use super::Channel;

/// Test double that replays scripted reads and records writes.
///
/// Each scripted chunk is gated on a write count, and optionally on an
/// offset from channel creation: it becomes readable only once at least
/// that many writes have happened and the offset has elapsed, mimicking
/// a device that only talks after being poked and delivers output in
/// delayed pieces. Ungated reads return empty. The channel stays alive
/// unless killed.
pub(crate) struct ScriptedChannel {
    script: VecDeque<(usize, Duration, Vec<u8>)>,
    epoch: Instant,
    pub(crate) writes: Vec<Vec<u8>>,
    /// Polls that found the script already exhausted.
    pub(crate) reads_after_script: usize,
    alive: bool,
    die_after_reads: Option<usize>,
    reads_served: usize,
}

impl ScriptedChannel {
    /// Build from `(after_writes, chunk)` pairs.
    pub(crate) fn new<I, B>(script: I) -> Self
    where
        I: IntoIterator<Item = (usize, B)>,
        B: Into<Vec<u8>>,
    {
        Self::timed(
            script
                .into_iter()
                .map(|(n, b)| (n, Duration::ZERO, b)),
        )
    }

    /// Build from `(after_writes, not_before, chunk)` triples, where
    /// `not_before` is an offset from channel creation.
    pub(crate) fn timed<I, B>(script: I) -> Self
    where
        I: IntoIterator<Item = (usize, Duration, B)>,
        B: Into<Vec<u8>>,
    {
        Self {
            script: script
                .into_iter()
                .map(|(n, at, b)| (n, at, b.into()))
                .collect(),
            epoch: Instant::now(),
            writes: Vec::new(),
            reads_after_script: 0,
            alive: true,
            die_after_reads: None,
            reads_served: 0,
        }
    }

    /// A channel that never produces output.
    pub(crate) fn silent() -> Self {
        Self::new(Vec::<(usize, Vec<u8>)>::new())
    }

    /// Report the channel as dead once `n` reads have been served.
    pub(crate) fn die_after_reads(mut self, n: usize) -> Self {
        self.die_after_reads = Some(n);
        self
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    /// Everything written so far, concatenated.
    pub(crate) fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl Channel for ScriptedChannel {
    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.writes.push(data.to_vec());
        Ok(())
    }

    async fn read_available(&mut self) -> io::Result<Vec<u8>> {
        self.reads_served += 1;
        if let Some(limit) = self.die_after_reads {
            if self.reads_served > limit {
                self.alive = false;
            }
        }
        match self.script.front() {
            Some((after_writes, not_before, _))
                if *after_writes <= self.writes.len() && self.epoch.elapsed() >= *not_before =>
            {
                let (_, _, chunk) = self.script.pop_front().expect("front just checked");
                Ok(chunk)
            }
            Some(_) => Ok(Vec::new()),
            None => {
                self.reads_after_script += 1;
                Ok(Vec::new())
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}
