//! Conversion presets for common use cases.

use once_cell::sync::Lazy;

use super::types::{ConversionPreset, FormatCategory};

static PRESETS: Lazy<Vec<ConversionPreset>> = Lazy::new(|| {
    vec![
        ConversionPreset {
            key: "web-optimized",
            name: "Web Optimized",
            description: "Optimized for web use with smaller file sizes",
            targets: vec![
                (FormatCategory::Image, "webp"),
                (FormatCategory::Video, "mp4"),
                (FormatCategory::Audio, "mp3"),
            ],
        },
        ConversionPreset {
            key: "high-quality",
            name: "High Quality",
            description: "Maximum quality with larger file sizes",
            targets: vec![
                (FormatCategory::Image, "png"),
                (FormatCategory::Video, "mov"),
                (FormatCategory::Audio, "flac"),
            ],
        },
        ConversionPreset {
            key: "universal",
            name: "Universal Compatibility",
            description: "Compatible with most devices and software",
            targets: vec![
                (FormatCategory::Image, "jpg"),
                (FormatCategory::Video, "mp4"),
                (FormatCategory::Audio, "mp3"),
                (FormatCategory::Document, "pdf"),
            ],
        },
    ]
});

/// All built-in presets.
pub fn presets() -> &'static [ConversionPreset] {
    &PRESETS
}

/// Finds a preset by key.
pub fn preset(key: &str) -> Option<&'static ConversionPreset> {
    PRESETS.iter().find(|p| p.key == key)
}
