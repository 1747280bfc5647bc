//! Device profiles: per-platform timing and banner configuration.
//!
//! What Python libraries like netmiko express as an inheritance
//! hierarchy (base driver, vendor family, platform class) is plain data
//! here: a
//! [`DeviceProfile`] carries the banner markers, line separator, and
//! timing constants for one device class, and a registry keyed on the
//! device-type string selects the right one.

mod profiles;
mod registry;

pub use registry::ProfileRegistry;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A known banner class and the extra settle time it requires.
///
/// Banners are matched by case-insensitive substring containment. When a
/// marker is seen during prompt discovery, the detector sleeps the settle
/// offset and re-reads, because these banners are typically followed by
/// more device-generated text before the real prompt line appears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerRule {
    /// Substring identifying the banner (matched case-insensitively).
    pub marker: String,

    /// Extra wait before trusting the next read, scaled by delay factor.
    pub settle: Duration,
}

impl BannerRule {
    pub fn new(marker: impl Into<String>, settle: Duration) -> Self {
        Self {
            marker: marker.into(),
            settle,
        }
    }

    /// Whether `text` contains this banner's marker, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.marker.to_lowercase())
    }
}

/// Per-platform configuration consumed by the session engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Device-type key (e.g. "generic", "cisco_xr").
    pub device_type: String,

    /// The device's response line terminator.
    pub line_separator: String,

    /// Banner classes that need extra settle time during prompt discovery.
    pub banner_rules: Vec<BannerRule>,

    /// Marker a device prints mid-response when paginating large output.
    pub large_output_marker: Option<String>,

    /// Baseline delay factor for this device class.
    pub base_delay_factor: f64,

    /// Fast CLI mode: prefer the smaller of requested and baseline
    /// delay factors instead of the larger.
    pub fast_cli: bool,
}

impl DeviceProfile {
    /// Minimal profile with no banner heuristics.
    pub fn new(device_type: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            line_separator: "\n".to_string(),
            banner_rules: Vec::new(),
            large_output_marker: None,
            base_delay_factor: 1.0,
            fast_cli: false,
        }
    }

    pub fn with_line_separator(mut self, sep: impl Into<String>) -> Self {
        self.line_separator = sep.into();
        self
    }

    pub fn with_banner_rule(mut self, rule: BannerRule) -> Self {
        self.banner_rules.push(rule);
        self
    }

    pub fn with_large_output_marker(mut self, marker: impl Into<String>) -> Self {
        self.large_output_marker = Some(marker.into());
        self
    }

    pub fn with_base_delay_factor(mut self, factor: f64) -> Self {
        self.base_delay_factor = factor;
        self
    }

    pub fn with_fast_cli(mut self, fast_cli: bool) -> Self {
        self.fast_cli = fast_cli;
        self
    }

    /// Resolve a requested delay factor against this device class.
    ///
    /// Slow device classes win: the larger factor is used unless the
    /// profile is marked `fast_cli`, in which case the smaller one is.
    pub fn select_delay_factor(&self, requested: f64) -> f64 {
        if self.fast_cli {
            requested.min(self.base_delay_factor)
        } else {
            requested.max(self.base_delay_factor)
        }
    }

    /// First banner rule whose marker appears in `text`, if any.
    pub fn matching_banner(&self, text: &str) -> Option<&BannerRule> {
        self.banner_rules.iter().find(|rule| rule.matches(text))
    }
}
