//! Size multipliers for source → target pairs.

/// (source, [(target, multiplier)]).
const MULTIPLIERS: &[(&str, &[(&str, f64)])] = &[
    // Images
    (
        "jpg",
        &[("png", 2.5), ("gif", 0.8), ("bmp", 5.0), ("webp", 0.7), ("tiff", 3.2), ("ico", 0.1)],
    ),
    (
        "png",
        &[("jpg", 0.4), ("gif", 0.6), ("bmp", 3.0), ("webp", 0.5), ("tiff", 2.1), ("ico", 0.05)],
    ),
    (
        "gif",
        &[("jpg", 1.2), ("png", 1.8), ("webp", 0.8), ("bmp", 4.0), ("tiff", 2.5)],
    ),
    (
        "bmp",
        &[("jpg", 0.2), ("png", 0.3), ("gif", 0.15), ("webp", 0.1), ("tiff", 0.8)],
    ),
    (
        "webp",
        &[("jpg", 1.4), ("png", 2.0), ("gif", 1.2), ("bmp", 10.0), ("tiff", 3.5)],
    ),
    // Audio
    (
        "wav",
        &[("mp3", 0.1), ("aac", 0.12), ("ogg", 0.15), ("flac", 0.6), ("m4a", 0.11), ("wma", 0.13)],
    ),
    (
        "flac",
        &[("mp3", 0.15), ("wav", 1.7), ("aac", 0.18), ("ogg", 0.2), ("m4a", 0.16), ("wma", 0.19)],
    ),
    (
        "mp3",
        &[("wav", 10.0), ("flac", 6.0), ("aac", 1.2), ("ogg", 1.1), ("m4a", 1.1), ("wma", 1.3)],
    ),
    (
        "aac",
        &[("mp3", 0.9), ("wav", 8.5), ("flac", 5.2), ("ogg", 1.0), ("m4a", 1.0), ("wma", 1.1)],
    ),
    // Video
    (
        "mp4",
        &[("avi", 1.2), ("mov", 1.1), ("wmv", 0.9), ("flv", 0.8), ("mkv", 1.0), ("webm", 0.7)],
    ),
    (
        "avi",
        &[("mp4", 0.8), ("mov", 0.9), ("wmv", 0.7), ("flv", 0.6), ("mkv", 0.85), ("webm", 0.6)],
    ),
    (
        "mov",
        &[("mp4", 0.9), ("avi", 1.1), ("wmv", 0.8), ("flv", 0.7), ("mkv", 0.95), ("webm", 0.65)],
    ),
    // Documents
    (
        "pdf",
        &[("doc", 0.3), ("docx", 0.25), ("txt", 0.05), ("rtf", 0.15), ("odt", 0.2)],
    ),
    (
        "doc",
        &[("pdf", 3.5), ("docx", 0.8), ("txt", 0.1), ("rtf", 1.2), ("odt", 0.9)],
    ),
    (
        "docx",
        &[("pdf", 4.0), ("doc", 1.2), ("txt", 0.08), ("rtf", 1.5), ("odt", 1.0)],
    ),
];

/// Returns the size multiplier for a pair, 1.0 when the pair is not listed.
pub fn multiplier(from: &str, to: &str) -> f64 {
    MULTIPLIERS
        .iter()
        .find(|(source, _)| *source == from)
        .and_then(|(_, targets)| targets.iter().find(|(target, _)| *target == to))
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}
