//! Enumerated request parameters and file-picker acceptance rules.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Largest file the picker accepts: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Output framing requested from the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// `1:1`
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// `4:3`
    #[serde(rename = "4:3")]
    Standard,
    /// `16:9`
    #[serde(rename = "16:9")]
    Landscape,
    /// `9:16`
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Every selectable ratio, in display order.
    pub const ALL: [Self; 4] = [Self::Square, Self::Standard, Self::Landscape, Self::Portrait];

    /// The wire token sent as the `aspect_ratio` form field.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Short human description shown next to the token.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Square => "Square",
            Self::Standard => "Standard",
            Self::Landscape => "Landscape",
            Self::Portrait => "Portrait",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL.into_iter().find(|r| r.token() == trimmed).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|r| r.token()).collect();
            format!("Unsupported aspect ratio '{trimmed}'. Valid: {}", valid.join(", "))
        })
    }
}

/// Media type for an accepted image path, judged by extension.
///
/// Returns `None` when the extension is not one the picker accepts.
#[must_use]
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
