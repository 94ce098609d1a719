//! Static format tables and lookups.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

use super::types::{FormatCategory, FormatEntry, FormatInfo};

use FormatCategory::*;

/// Every recognized extension: (extension, category, name, description).
const FORMATS: &[(&str, FormatCategory, &str, &str)] = &[
    // Images
    ("jpg", Image, "JPEG", "JPEG Image"),
    ("jpeg", Image, "JPEG", "JPEG Image"),
    ("png", Image, "PNG", "PNG Image"),
    ("gif", Image, "GIF", "GIF Image"),
    ("bmp", Image, "BMP", "Bitmap Image"),
    ("tiff", Image, "TIFF", "TIFF Image"),
    ("tif", Image, "TIFF", "TIFF Image"),
    ("svg", Image, "SVG", "SVG Vector"),
    ("webp", Image, "WEBP", "WebP Image"),
    ("ico", Image, "ICO", "Icon File"),
    ("psd", Image, "PSD", "Photoshop Document"),
    // Documents
    ("pdf", Document, "PDF", "PDF Document"),
    ("doc", Document, "DOC", "Word Document"),
    ("docx", Document, "DOCX", "Word Document"),
    ("xls", Document, "XLS", "Excel Spreadsheet"),
    ("xlsx", Document, "XLSX", "Excel Spreadsheet"),
    ("ppt", Document, "PPT", "PowerPoint"),
    ("pptx", Document, "PPTX", "PowerPoint"),
    ("txt", Document, "TXT", "Text File"),
    ("rtf", Document, "RTF", "Rich Text Format"),
    ("odt", Document, "ODT", "OpenDocument Text"),
    ("ods", Document, "ODS", "OpenDocument Spreadsheet"),
    ("odp", Document, "ODP", "OpenDocument Presentation"),
    // Audio
    ("mp3", Audio, "MP3", "MP3 Audio"),
    ("wav", Audio, "WAV", "WAV Audio"),
    ("flac", Audio, "FLAC", "FLAC Audio"),
    ("aac", Audio, "AAC", "AAC Audio"),
    ("ogg", Audio, "OGG", "OGG Audio"),
    ("m4a", Audio, "M4A", "M4A Audio"),
    ("wma", Audio, "WMA", "WMA Audio"),
    ("aiff", Audio, "AIFF", "AIFF Audio"),
    ("au", Audio, "AU", "AU Audio"),
    // Video
    ("mp4", Video, "MP4", "MP4 Video"),
    ("avi", Video, "AVI", "AVI Video"),
    ("mov", Video, "MOV", "MOV Video"),
    ("wmv", Video, "WMV", "WMV Video"),
    ("flv", Video, "FLV", "FLV Video"),
    ("mkv", Video, "MKV", "MKV Video"),
    ("webm", Video, "WEBM", "WebM Video"),
    ("m4v", Video, "M4V", "M4V Video"),
    ("3gp", Video, "3GP", "3GP Video"),
    ("mpg", Video, "MPG", "MPEG Video"),
    ("mpeg", Video, "MPEG", "MPEG Video"),
    // Archives
    ("zip", Archive, "ZIP", "ZIP Archive"),
    ("rar", Archive, "RAR", "RAR Archive"),
    ("7z", Archive, "7Z", "7-Zip Archive"),
    ("tar", Archive, "TAR", "TAR Archive"),
    ("gz", Archive, "GZ", "GZIP Archive"),
    ("bz2", Archive, "BZ2", "BZIP2 Archive"),
    // Ebooks
    ("epub", Ebook, "EPUB", "EPUB Ebook"),
    ("mobi", Ebook, "MOBI", "MOBI Ebook"),
    ("azw", Ebook, "AZW", "AZW Ebook"),
    ("azw3", Ebook, "AZW3", "AZW3 Ebook"),
    ("fb2", Ebook, "FB2", "FB2 Ebook"),
    // CAD
    ("dwg", Cad, "DWG", "AutoCAD Drawing"),
    ("dxf", Cad, "DXF", "AutoCAD Exchange"),
    ("step", Cad, "STEP", "STEP 3D Model"),
    ("stp", Cad, "STP", "STEP 3D Model"),
    ("iges", Cad, "IGES", "IGES 3D Model"),
    ("igs", Cad, "IGS", "IGES 3D Model"),
];

const IMAGE_TARGETS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "webp", "ico", "psd",
];
const DOCUMENT_TARGETS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx", "ods", "odp",
];
const AUDIO_TARGETS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "m4a", "wma", "aiff", "au",
];
const VIDEO_TARGETS: &[&str] = &[
    "mp4", "avi", "mov", "wmv", "flv", "mkv", "webm", "m4v", "3gp", "mpg", "mpeg",
];
const ARCHIVE_TARGETS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2"];
const EBOOK_TARGETS: &[&str] = &["epub", "mobi", "azw", "azw3", "fb2", "pdf"];
const CAD_TARGETS: &[&str] = &["dwg", "dxf", "step", "stp", "iges", "igs", "pdf"];

/// Offered for files whose extension the catalog does not know.
const UNKNOWN_TARGETS: &[&str] = &["pdf", "txt", "jpg", "png", "mp3", "mp4"];

/// Hand-picked common conversions for a few source formats.
const POPULAR: &[(&str, &[&str])] = &[
    ("pdf", &["doc", "docx", "jpg", "png", "txt"]),
    ("jpg", &["png", "gif", "bmp", "webp", "pdf"]),
    ("png", &["jpg", "gif", "bmp", "webp", "ico"]),
    ("mp4", &["avi", "mov", "wmv", "mkv", "webm"]),
    ("mp3", &["wav", "flac", "aac", "ogg", "m4a"]),
    ("docx", &["pdf", "doc", "txt", "rtf", "odt"]),
    ("xlsx", &["xls", "pdf", "ods"]),
];

static CATALOG: Lazy<HashMap<&'static str, FormatInfo>> = Lazy::new(|| {
    FORMATS
        .iter()
        .map(|(ext, category, name, description)| {
            (
                *ext,
                FormatInfo {
                    category: *category,
                    name: name.to_string(),
                    description: description.to_string(),
                },
            )
        })
        .collect()
});

/// Returns the lowercase extension after the last `.`, or an empty string.
pub fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => filename[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Looks up format info. Unknown extensions get the `Unknown` category.
pub fn info_for(extension: &str) -> FormatInfo {
    if let Some(info) = CATALOG.get(extension) {
        return info.clone();
    }

    FormatInfo {
        category: FormatCategory::Unknown,
        name: if extension.is_empty() {
            "Unknown".to_string()
        } else {
            extension.to_uppercase()
        },
        description: "Unknown File".to_string(),
    }
}

/// Whether the extension is present in the catalog.
pub fn is_known_format(extension: &str) -> bool {
    CATALOG.contains_key(extension)
}

/// Target extensions reachable from a category.
pub fn available_targets(category: FormatCategory) -> &'static [&'static str] {
    match category {
        FormatCategory::Image => IMAGE_TARGETS,
        FormatCategory::Document => DOCUMENT_TARGETS,
        FormatCategory::Audio => AUDIO_TARGETS,
        FormatCategory::Video => VIDEO_TARGETS,
        FormatCategory::Archive => ARCHIVE_TARGETS,
        FormatCategory::Ebook => EBOOK_TARGETS,
        FormatCategory::Cad => CAD_TARGETS,
        FormatCategory::Unknown => UNKNOWN_TARGETS,
    }
}

/// Target extensions reachable from a source extension.
pub fn targets_for(extension: &str) -> &'static [&'static str] {
    available_targets(info_for(extension).category)
}

/// Whether converting `from` into `to` is possible.
pub fn is_supported(from: &str, to: &str) -> bool {
    targets_for(from).contains(&to)
}

/// Commonly requested targets for a source extension.
///
/// Falls back to the first five available targets when no curated list exists.
pub fn popular_targets(extension: &str) -> Vec<&'static str> {
    let allowed = targets_for(extension);
    POPULAR
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, targets)| {
            targets
                .iter()
                .filter(|t| allowed.contains(*t))
                .copied()
                .collect()
        })
        .unwrap_or_else(|| allowed.iter().take(5).copied().collect())
}

/// All catalog entries grouped by category, each group sorted by display name.
pub fn formats_by_category() -> BTreeMap<FormatCategory, Vec<FormatEntry>> {
    let mut grouped: BTreeMap<FormatCategory, Vec<FormatEntry>> = BTreeMap::new();

    for (ext, category, name, description) in FORMATS {
        grouped.entry(*category).or_default().push(FormatEntry {
            extension: ext.to_string(),
            info: FormatInfo {
                category: *category,
                name: name.to_string(),
                description: description.to_string(),
            },
        });
    }

    for entries in grouped.values_mut() {
        entries.sort_by(|a, b| a.info.name.cmp(&b.info.name));
    }

    grouped
}

/// Case-insensitive substring search over extension, name and description.
pub fn search_formats(query: &str) -> Vec<FormatEntry> {
    let term = query.to_lowercase();

    FORMATS
        .iter()
        .filter(|(ext, _, name, description)| {
            ext.contains(&term)
                || name.to_lowercase().contains(&term)
                || description.to_lowercase().contains(&term)
        })
        .map(|(ext, category, name, description)| FormatEntry {
            extension: ext.to_string(),
            info: FormatInfo {
                category: *category,
                name: name.to_string(),
                description: description.to_string(),
            },
        })
        .collect()
}

/// Formats a byte count for humans ("0 Bytes", "1.5 KB", "100 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
