//! Per-format output quality options.

use serde::Serialize;

/// Encoder setting a quality option resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySetting {
    /// Lossy image quality, 1-100.
    Quality(u8),
    /// Audio bitrate in kbps.
    BitrateKbps(u32),
    /// Video frame size as `WIDTHxHEIGHT`.
    Resolution(&'static str),
}

/// One selectable quality level for a target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityOption {
    pub value: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub setting: QualitySetting,
}

impl QualityOption {
    const fn new(value: &'static str, label: &'static str, setting: QualitySetting) -> Self {
        Self {
            value,
            label,
            setting,
        }
    }

    /// Image quality, when this option carries one.
    pub fn quality(&self) -> Option<u8> {
        match self.setting {
            QualitySetting::Quality(q) => Some(q),
            _ => None,
        }
    }
}

use QualitySetting::{BitrateKbps, Quality, Resolution};

const JPG: &[QualityOption] = &[
    QualityOption::new("high", "High Quality", Quality(95)),
    QualityOption::new("medium", "Medium Quality", Quality(80)),
    QualityOption::new("low", "Low Quality", Quality(60)),
];

const PNG: &[QualityOption] = &[QualityOption::new("lossless", "Lossless", Quality(100))];

const WEBP: &[QualityOption] = &[
    QualityOption::new("high", "High Quality", Quality(90)),
    QualityOption::new("medium", "Medium Quality", Quality(75)),
    QualityOption::new("low", "Low Quality", Quality(50)),
];

const MP3: &[QualityOption] = &[
    QualityOption::new("high", "320 kbps", BitrateKbps(320)),
    QualityOption::new("medium", "192 kbps", BitrateKbps(192)),
    QualityOption::new("low", "128 kbps", BitrateKbps(128)),
];

const AAC: &[QualityOption] = &[
    QualityOption::new("high", "256 kbps", BitrateKbps(256)),
    QualityOption::new("medium", "128 kbps", BitrateKbps(128)),
    QualityOption::new("low", "96 kbps", BitrateKbps(96)),
];

const MP4: &[QualityOption] = &[
    QualityOption::new("hd", "1080p HD", Resolution("1920x1080")),
    QualityOption::new("hd720", "720p HD", Resolution("1280x720")),
    QualityOption::new("sd", "480p SD", Resolution("854x480")),
];

/// Quality levels offered for a target extension. Empty when the format
/// has no tunable quality.
pub fn quality_options(ext: &str) -> &'static [QualityOption] {
    match ext {
        "jpg" | "jpeg" => JPG,
        "png" => PNG,
        "webp" => WEBP,
        "mp3" => MP3,
        "aac" => AAC,
        "mp4" => MP4,
        _ => &[],
    }
}

/// Finds the quality level named `value` for `ext`.
pub fn quality_option(ext: &str, value: &str) -> Option<&'static QualityOption> {
    quality_options(ext).iter().find(|o| o.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_levels_descend() {
        let levels: Vec<u8> = quality_options("jpg")
            .iter()
            .filter_map(QualityOption::quality)
            .collect();
        assert_eq!(levels, vec![95, 80, 60]);
        assert_eq!(quality_options("jpeg"), quality_options("jpg"));
    }

    #[test]
    fn test_lookup_by_value() {
        assert_eq!(quality_option("webp", "low").unwrap().quality(), Some(50));
        assert_eq!(
            quality_option("mp3", "medium").unwrap().setting,
            QualitySetting::BitrateKbps(192)
        );
        assert_eq!(quality_option("mp4", "hd720").unwrap().quality(), None);
        assert!(quality_option("jpg", "ultra").is_none());
        assert!(quality_option("gif", "high").is_none());
    }

    #[test]
    fn test_formats_without_levels() {
        assert!(quality_options("gif").is_empty());
        assert!(quality_options("pdf").is_empty());
        assert!(quality_options("").is_empty());
    }

    #[test]
    fn test_every_option_targets_a_catalog_format() {
        for ext in ["jpg", "jpeg", "png", "webp", "mp3", "aac", "mp4"] {
            assert!(crate::formats::is_known_format(ext), "{ext}");
            assert!(!quality_options(ext).is_empty(), "{ext}");
        }
    }

    #[test]
    fn test_serializes_setting_inline() {
        let json = serde_json::to_value(quality_option("aac", "low").unwrap()).unwrap();
        assert_eq!(json["value"], "low");
        assert_eq!(json["label"], "96 kbps");
        assert_eq!(json["bitrate_kbps"], 96);

        let json = serde_json::to_value(quality_option("mp4", "sd").unwrap()).unwrap();
        assert_eq!(json["resolution"], "854x480");
    }
}
