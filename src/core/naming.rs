//! File naming for stored videos.

use crate::domain::VideoDetail;

/// Extension of every stored video
pub const VIDEO_EXTENSION: &str = "mp4";

/// Longest file name most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

/// Suffix of the hidden file a video streams into before it is renamed
pub const PARTIAL_SUFFIX: &str = ".part";

const ILLEGAL_CHARS: &[char] = &['/', '?', '<', '>', '\\', ':', '*', '|', '"'];

const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Make a title safe to use as a file name on common filesystems.
///
/// May return an empty string when nothing usable is left.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();

    if cleaned == "." || cleaned == ".." {
        return String::new();
    }

    let stem = cleaned.split('.').next().unwrap_or_default().to_ascii_lowercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        return String::new();
    }

    let trimmed = cleaned.trim_end_matches(['.', ' ']);
    truncate_to_bytes(trimmed, MAX_FILENAME_BYTES).to_string()
}

fn truncate_to_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }

    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Hidden sibling that receives content while streaming: `.<filename>.part`
pub fn partial_name_for(filename: &str) -> String {
    format!(".{}{}", filename, PARTIAL_SUFFIX)
}

/// Final file name for a video: sanitized title plus extension.
///
/// Falls back to the video id when the title sanitizes to nothing. The stem
/// is short enough that the partial name also fits the filesystem limit.
pub fn file_name_for(detail: &VideoDetail) -> String {
    let budget = MAX_FILENAME_BYTES - VIDEO_EXTENSION.len() - 1 - 1 - PARTIAL_SUFFIX.len();

    let stem = sanitize_filename(&detail.title);
    let stem = if stem.is_empty() {
        sanitize_filename(detail.video_id.as_str())
    } else {
        stem
    };

    format!("{}.{}", truncate_to_bytes(&stem, budget), VIDEO_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_sanitize_removes_illegal_characters() {
        assert_eq!(sanitize_filename("AC/DC: Live? <2024>"), "ACDC Live 2024");
        assert_eq!(sanitize_filename("tab\there"), "tabhere");
        assert_eq!(sanitize_filename(r#"a"b|c*d\e"#), "abcde");
    }

    #[test]
    fn test_sanitize_reserved_names() {
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("CON"), "");
        assert_eq!(sanitize_filename("lpt1.txt"), "");
        assert_eq!(sanitize_filename("Console wars"), "Console wars");
    }

    #[test]
    fn test_sanitize_trailing_dots_and_spaces() {
        assert_eq!(sanitize_filename("Wait for it... "), "Wait for it");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let title = "é".repeat(200);
        let sanitized = sanitize_filename(&title);
        assert!(sanitized.len() <= 255);
        assert!(sanitized.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_file_name_for() {
        let detail = VideoDetail::new("abc", "1 - Intro: part 1", Utc::now());
        assert_eq!(file_name_for(&detail), "1 - Intro part 1.mp4");

        let nameless = VideoDetail::new("abc", "???", Utc::now());
        assert_eq!(file_name_for(&nameless), "abc.mp4");
    }

    #[test]
    fn test_long_titles_leave_room_for_partial_name() {
        for title in ["中".repeat(90), "x".repeat(250)] {
            let name = file_name_for(&VideoDetail::new("abc", title, Utc::now()));
            assert!(name.ends_with(".mp4"));
            assert!(partial_name_for(&name).len() <= MAX_FILENAME_BYTES);
        }

        let name = file_name_for(&VideoDetail::new("abc", "x".repeat(250), Utc::now()));
        assert_eq!(partial_name_for(&name).len(), MAX_FILENAME_BYTES);
    }
}
