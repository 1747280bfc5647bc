//! Channel abstraction for interactive sessions.
//!
//! The core engine does not own a transport. It borrows an
//! already-established interactive shell (SSH, telnet, serial console)
//! through the [`Channel`] trait and drives it with non-blocking reads.

#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;
use std::io;

/// Bidirectional byte stream representing an established interactive shell.
///
/// Implementations are expected to be non-blocking on the read side:
/// [`read_available`](Channel::read_available) returns whatever the
/// transport has buffered right now, possibly nothing. The engine layers
/// all waiting, pattern matching, and timeout handling on top.
///
/// A session borrows the channel for the duration of each call; only one
/// in-flight operation per channel is supported. Callers that need
/// concurrency should use one session per device connection.
pub trait Channel: Send {
    /// Queue bytes for transmission. Does not wait for a response.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Return all bytes currently buffered by the transport.
    ///
    /// Must not block: returns an empty `Vec` when nothing is pending.
    fn read_available(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Whether the underlying transport session is still connected.
    fn is_alive(&self) -> bool;

    /// Discard any bytes pending in the transport's read buffer.
    ///
    /// The default implementation drains [`read_available`](Channel::read_available)
    /// until it comes back empty.
    fn clear_buffer(&mut self) -> impl Future<Output = io::Result<()>> + Send {
        async {
            while !self.read_available().await?.is_empty() {}
            Ok(())
        }
    }
}
