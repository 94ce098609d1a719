//! Format catalog.
//!
//! Static, process-wide tables describing every recognized file extension,
//! which category it belongs to, and which target formats a category can be
//! converted into. All lookups are pure and safe to call from any thread.
//!
//! # Example
//!
//! ```
//! use fileshift_core::formats::{extension_of, info_for, is_supported, FormatCategory};
//!
//! let ext = extension_of("Holiday.JPG");
//! assert_eq!(ext, "jpg");
//! assert_eq!(info_for(&ext).category, FormatCategory::Image);
//! assert!(is_supported(&ext, "png"));
//! assert!(!is_supported(&ext, "mp3"));
//! ```

mod catalog;
mod presets;
mod quality;
mod types;

pub use catalog::{
    available_targets, extension_of, format_file_size, formats_by_category, info_for,
    is_known_format, is_supported, popular_targets, search_formats, targets_for,
};
pub use presets::{preset, presets};
pub use quality::{quality_option, quality_options, QualityOption, QualitySetting};
pub use types::{ConversionPreset, FormatCategory, FormatEntry, FormatInfo};
