//! Output sanitization: echo and trailing-prompt removal.
//!
//! Applied after completion is detected, per the caller's flags. These
//! operate on already-normalized text (canonical line separators, no
//! terminal artifacts).

use regex::Regex;

/// Remove the echoed command from the front of the output.
///
/// The echo occupies the first line of the captured buffer; containment
/// rather than equality is used because backspace repair or trailing
/// terminal junk can leave the echo line inexact.
pub fn strip_command_echo(output: &str, command: &str, separator: &str) -> String {
    let command = command.trim();
    if let Some((first, rest)) = output.split_once(separator) {
        if first.contains(command) {
            return rest.to_string();
        }
    } else if output.trim() == command {
        return String::new();
    }
    output.to_string()
}

/// Remove the trailing prompt line when it matches the completion pattern.
pub fn strip_trailing_prompt(output: &str, pattern: &Regex, separator: &str) -> String {
    if let Some((rest, last)) = output.rsplit_once(separator) {
        if pattern.is_match(last) {
            return rest.to_string();
        }
    } else if pattern.is_match(output) {
        return String::new();
    }
    output.to_string()
}
