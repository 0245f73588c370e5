//! Auto-detection of a source's ingestion path (spec §4.2 Auto-detection).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Video,
    Documentation,
    Website,
    WebsiteDocumentation,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceType::Video => "video",
            SourceType::Documentation => "documentation",
            SourceType::Website => "website",
            SourceType::WebsiteDocumentation => "website_documentation",
        };
        write!(f, "{s}")
    }
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv"];
const DOCUMENTATION_EXTENSIONS: &[&str] = &["pdf", "md", "txt", "html", "rst", "docx", "doc"];

/// Detects a source's [`SourceType`] from its URL or path, honoring an
/// explicit override (a caller-supplied `type?` in the `(url_or_path, name,
/// type?)` tuple) when present.
pub fn detect_source_type(url_or_path: &str, explicit: Option<SourceType>) -> SourceType {
    if let Some(explicit) = explicit {
        return explicit;
    }

    let extension = extension_of(url_or_path).map(|e| e.to_ascii_lowercase());
    if let Some(ext) = extension.as_deref() {
        if VIDEO_EXTENSIONS.contains(&ext) {
            return SourceType::Video;
        }
        if DOCUMENTATION_EXTENSIONS.contains(&ext) {
            return SourceType::Documentation;
        }
    }

    if url_or_path.starts_with("file://") {
        return SourceType::Documentation;
    }
    if url_or_path.starts_with("http://") || url_or_path.starts_with("https://") {
        return SourceType::Website;
    }
    SourceType::WebsiteDocumentation
}

fn extension_of(url_or_path: &str) -> Option<&str> {
    let without_query = url_or_path.split(['?', '#']).next().unwrap_or(url_or_path);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);
    last_segment.rsplit_once('.').map(|(_, ext)| ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_video_by_extension() {
        assert_eq!(
            detect_source_type("https://cdn.example.com/demo.mp4", None),
            SourceType::Video
        );
    }

    #[test]
    fn detects_documentation_by_extension() {
        assert_eq!(detect_source_type("docs/guide.md", None), SourceType::Documentation);
        assert_eq!(
            detect_source_type("https://example.com/manual.pdf", None),
            SourceType::Documentation
        );
    }

    #[test]
    fn file_scheme_defaults_to_documentation() {
        assert_eq!(
            detect_source_type("file:///home/user/notes", None),
            SourceType::Documentation
        );
    }

    #[test]
    fn http_without_known_extension_is_website_crawl() {
        assert_eq!(detect_source_type("https://example.com/app", None), SourceType::Website);
    }

    #[test]
    fn anything_else_falls_back_to_website_documentation() {
        assert_eq!(
            detect_source_type("s3://bucket/key", None),
            SourceType::WebsiteDocumentation
        );
    }

    #[test]
    fn explicit_override_wins() {
        assert_eq!(
            detect_source_type("ignored.mp4", Some(SourceType::Documentation)),
            SourceType::Documentation
        );
    }
}
