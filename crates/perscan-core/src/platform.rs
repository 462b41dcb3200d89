use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A review platform the scanner knows how to fetch from.
///
/// Serializes as the canonical display label (`"Google Play Store"`, ...), which is
/// also the value stored in the `platform` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Google Play Store")]
    GooglePlay,
    #[serde(rename = "iOS App Store")]
    IosAppStore,
    #[serde(rename = "YouTube")]
    YouTube,
    #[serde(rename = "Product Hunt")]
    ProductHunt,
    #[serde(rename = "Reddit")]
    Reddit,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::GooglePlay,
        Platform::IosAppStore,
        Platform::YouTube,
        Platform::ProductHunt,
        Platform::Reddit,
    ];

    /// Canonical label attached to every review from this platform.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Platform::GooglePlay => "Google Play Store",
            Platform::IosAppStore => "iOS App Store",
            Platform::YouTube => "YouTube",
            Platform::ProductHunt => "Product Hunt",
            Platform::Reddit => "Reddit",
        }
    }

    /// Short machine key used in CLI flags and query strings.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Platform::GooglePlay => "google_play",
            Platform::IosAppStore => "ios_app_store",
            Platform::YouTube => "youtube",
            Platform::ProductHunt => "product_hunt",
            Platform::Reddit => "reddit",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    /// Accepts either the machine key or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(needle) || p.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ConfigError::UnknownPlatform(s.to_string()))
    }
}
