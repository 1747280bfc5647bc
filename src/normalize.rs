//! Text normalization for raw channel output.
//!
//! Device output arrives as an unstructured byte stream full of terminal
//! artifacts: ANSI escape sequences, NUL padding left behind by liveness
//! probes, mixed line endings, and echo lines repainted with backspaces on
//! slow links. This module reduces all of that to clean text that the
//! prompt and completion patterns can match against. It is deliberately
//! not a terminal emulator; only the artifacts that break pattern
//! matching are handled.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches every line-ending flavor devices are known to emit.
///
/// Longest alternatives first so canonicalization is idempotent.
static LINE_ENDINGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\r\n|\r\n|\n\r|\r|\n").expect("static pattern"));

/// CSI sequences, OSC window-title strings, charset selection, and the
/// single-character escapes seen from network devices. Bare control
/// characters (CR, LF, backspace) are intentionally left alone: the
/// line-ending canonicalization and backspace repair depend on them.
static ANSI_ESCAPES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[()][A-B0-2]|\x1b[=>78EHM]",
    )
    .expect("static pattern")
});

const BACKSPACE: u8 = 0x08;

/// Normalizes raw device output into canonical text.
///
/// Pure function of its inputs plus the session configuration it was
/// built from; holds no channel state.
#[derive(Debug, Clone)]
pub struct Normalizer {
    ansi_escape_handling: bool,
    line_separator: String,
}

impl Normalizer {
    pub fn new(ansi_escape_handling: bool, line_separator: impl Into<String>) -> Self {
        Self {
            ansi_escape_handling,
            line_separator: line_separator.into(),
        }
    }

    /// The canonical line separator this normalizer emits.
    pub fn line_separator(&self) -> &str {
        &self.line_separator
    }

    /// Full normalization pass over an accumulated output buffer.
    ///
    /// Applies, in order: NUL-marker removal, ANSI escape stripping (when
    /// enabled), line-ending canonicalization, and backspace-repaint
    /// repair against `completion` (when supplied). Idempotent.
    pub fn normalize(&self, raw: &str, completion: Option<&Regex>) -> String {
        let mut text = strip_null_markers(raw);
        if self.ansi_escape_handling {
            text = strip_ansi_escape_codes(&text);
        }
        text = self.normalize_line_endings(&text);
        if let Some(pattern) = completion {
            text = self.repair_backspace_repaint(&text, pattern);
        }
        text
    }

    /// Canonicalize every line-ending flavor to the session separator.
    pub fn normalize_line_endings(&self, text: &str) -> String {
        LINE_ENDINGS
            .replace_all(text, self.line_separator.as_str())
            .into_owned()
    }

    /// Repair a backspace-repainted echo line.
    ///
    /// Repainting only ever corrupts the echoed command, which sits on the
    /// first line of the accumulated buffer. When that line contains a
    /// backspace control character, everything from the first completion
    /// match to the end of the line is the repaint and gets dropped. Must
    /// run over the whole buffer, not the newest chunk: the repaint can
    /// arrive after several chunks were already appended.
    fn repair_backspace_repaint(&self, text: &str, completion: &Regex) -> String {
        let mut lines: Vec<&str> = text.split(self.line_separator.as_str()).collect();
        let Some(first) = lines.first() else {
            return text.to_string();
        };
        if memchr::memchr(BACKSPACE, first.as_bytes()).is_none() {
            return text.to_string();
        }
        let Ok(repaint) = Regex::new(&format!("(?:{}).*$", completion.as_str())) else {
            return text.to_string();
        };
        let repaired = repaint.replace(first, "").into_owned();
        lines[0] = &repaired;
        lines.join(&self.line_separator)
    }
}

/// Remove NUL bytes left in the stream by transport liveness probes.
pub fn strip_null_markers(text: &str) -> String {
    if memchr::memchr(0, text.as_bytes()).is_none() {
        return text.to_string();
    }
    text.replace('\0', "")
}

/// Strip ANSI/VT escape sequences.
pub fn strip_ansi_escape_codes(text: &str) -> String {
    ANSI_ESCAPES.replace_all(text, "").into_owned()
}
