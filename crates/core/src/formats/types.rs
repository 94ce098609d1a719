//! Types for the format catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse format grouping that decides which targets are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCategory {
    Image,
    Document,
    Audio,
    Video,
    Archive,
    Ebook,
    Cad,
    /// Extension not present in the catalog.
    Unknown,
}

impl FormatCategory {
    /// All known categories, `Unknown` excluded.
    pub const KNOWN: [FormatCategory; 7] = [
        FormatCategory::Image,
        FormatCategory::Document,
        FormatCategory::Audio,
        FormatCategory::Video,
        FormatCategory::Archive,
        FormatCategory::Ebook,
        FormatCategory::Cad,
    ];

    /// Returns the lowercase tag used in serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Archive => "archive",
            Self::Ebook => "ebook",
            Self::Cad => "cad",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive information about a file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Category of the format.
    pub category: FormatCategory,
    /// Short display name (e.g. "JPEG").
    pub name: String,
    /// Human description (e.g. "JPEG Image").
    pub description: String,
}

/// A catalog entry: an extension with its format info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatEntry {
    pub extension: String,
    #[serde(flatten)]
    pub info: FormatInfo,
}

/// A named set of recommended target formats per category.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPreset {
    /// Preset key (e.g. "web-optimized").
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Description.
    pub description: &'static str,
    /// Recommended target extension per category.
    pub targets: Vec<(FormatCategory, &'static str)>,
}

impl ConversionPreset {
    /// Returns the recommended target for a category, if the preset covers it.
    pub fn target_for(&self, category: FormatCategory) -> Option<&'static str> {
        self.targets
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, ext)| *ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&FormatCategory::Ebook).unwrap();
        assert_eq!(json, "\"ebook\"");
        let parsed: FormatCategory = serde_json::from_str("\"cad\"").unwrap();
        assert_eq!(parsed, FormatCategory::Cad);
    }

    #[test]
    fn test_entry_flattens_info() {
        let entry = FormatEntry {
            extension: "png".to_string(),
            info: FormatInfo {
                category: FormatCategory::Image,
                name: "PNG".to_string(),
                description: "PNG Image".to_string(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["extension"], "png");
        assert_eq!(json["category"], "image");
        assert_eq!(json["name"], "PNG");
    }
}
