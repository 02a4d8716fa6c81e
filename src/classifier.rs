//! Quality tier and orientation derived from pixel dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution tier of an image, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "720P")]
    Hd,
    #[serde(rename = "1080P")]
    FullHd,
    #[serde(rename = "2K")]
    Qhd,
    #[serde(rename = "4K")]
    Uhd4k,
    #[serde(rename = "8K")]
    Uhd8k,
}

impl Quality {
    pub fn label(&self) -> &'static str {
        match self {
            Quality::Unknown => "unknown",
            Quality::Sd => "SD",
            Quality::Hd => "720P",
            Quality::FullHd => "1080P",
            Quality::Qhd => "2K",
            Quality::Uhd4k => "4K",
            Quality::Uhd8k => "8K",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// (long side, short side, tier), highest first.
const TIER_TABLE: [(u32, u32, Quality); 5] = [
    (7680, 4320, Quality::Uhd8k),
    (3840, 2160, Quality::Uhd4k),
    (2560, 1440, Quality::Qhd),
    (1920, 1080, Quality::FullHd),
    (1280, 720, Quality::Hd),
];

/// Pure mapping from dimensions to tier and orientation.
///
/// Implementations must be deterministic: the same `(width, height)` always
/// yields the same answer.
pub trait Classifier: Send + Sync {
    fn quality(&self, width: u32, height: u32) -> Quality;

    /// `true` means landscape. Square images count as landscape.
    fn orientation(&self, width: u32, height: u32) -> bool {
        is_landscape(width, height)
    }
}

/// Tier table keyed on the long and short side, so portrait images rank the
/// same as their rotated landscape counterpart.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl Classifier for DefaultClassifier {
    fn quality(&self, width: u32, height: u32) -> Quality {
        if width == 0 || height == 0 {
            return Quality::Unknown;
        }
        let long = width.max(height);
        let short = width.min(height);
        TIER_TABLE
            .iter()
            .find(|(min_long, min_short, _)| long >= *min_long && short >= *min_short)
            .map(|(_, _, tier)| *tier)
            .unwrap_or(Quality::Sd)
    }
}

pub fn is_landscape(width: u32, height: u32) -> bool {
    width >= height
}
