//! # clidrive
//!
//! Async interactive CLI session engine for network device automation.
//!
//! clidrive drives an already-established interactive shell (SSH, telnet,
//! serial console) through the [`Channel`] trait and solves the hard part
//! of CLI scraping: deciding when the device has produced a prompt and
//! when a command's output has finished arriving, over a byte stream with
//! no message framing.
//!
//! ## Features
//!
//! - Prompt discovery with per-banner settle heuristics
//! - Pattern-based command completion (discovered prompt or caller regex)
//! - Wall-clock and fixed-iteration polling budgets
//! - Terminal artifact cleanup: ANSI escapes, NUL padding, mixed line
//!   endings, backspace-repainted echo
//! - Self-healing continuation for paginated "large output" responses
//! - Device profiles (banner markers, timing constants) selected from a
//!   registry keyed on device type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::io;
//! use clidrive::{Channel, ProfileRegistry, Session};
//!
//! /// Adapter over your transport's interactive shell.
//! struct MyShell;
//!
//! impl Channel for MyShell {
//!     async fn write(&mut self, _data: &[u8]) -> io::Result<()> {
//!         // hand bytes to the transport
//!         Ok(())
//!     }
//!
//!     async fn read_available(&mut self) -> io::Result<Vec<u8>> {
//!         // return whatever the transport has buffered, without blocking
//!         Ok(Vec::new())
//!     }
//!
//!     fn is_alive(&self) -> bool {
//!         true
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), clidrive::Error> {
//!     let profile = ProfileRegistry::resolve("cisco_xr");
//!     let mut session = Session::new(MyShell, profile);
//!
//!     let prompt = session.find_prompt().await?;
//!     println!("connected, prompt is {prompt}");
//!
//!     let output = session.send_command("show version").await?;
//!     println!("{output}");
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod normalize;
pub mod platform;
pub mod session;

// Re-export main types for convenience
pub use channel::Channel;
pub use error::{Error, Result};
pub use normalize::Normalizer;
pub use platform::{BannerRule, DeviceProfile, ProfileRegistry};
pub use session::{SendOptions, Session, SessionConfig};
