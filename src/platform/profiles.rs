//! Built-in device profiles.

use std::time::Duration;

use super::{BannerRule, DeviceProfile};

/// Marker Cisco XR class devices print while paginating a large response.
pub(crate) const LARGE_OUTPUT_MARKER: &str =
    "This could be a few minutes if your config is large";

/// Generic profile: newline separator, no banner heuristics.
pub(crate) fn generic() -> DeviceProfile {
    DeviceProfile::new("generic")
}

/// Cisco IOS XR class devices.
///
/// Settle offsets are per banner class: post-login banners finish fastest,
/// failover notices are followed by the most trailing output.
pub(crate) fn cisco_xr() -> DeviceProfile {
    DeviceProfile::new("cisco_xr")
        .with_banner_rule(BannerRule::new("last login", Duration::from_secs(3)))
        .with_banner_rule(BannerRule::new("autocommand", Duration::from_secs(4)))
        .with_banner_rule(BannerRule::new("failover", Duration::from_secs(5)))
        .with_large_output_marker(LARGE_OUTPUT_MARKER)
}
