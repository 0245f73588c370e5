//! Documentation ingester (spec §4.2): parses a source into canonical text,
//! cleans PDF-style header/footer/page-number noise, chunks it via
//! [`crate::chunking`], and appends a comprehensive-summary chunk.
//!
//! Per-format parsing (PDF/DOCX/HTML/MD extraction into the canonical
//! intermediate) is an out-of-scope black-box collaborator (spec §1); this
//! module operates on already-extracted text and the [`DocumentParser`]
//! trait exists only to make that boundary explicit and testable.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::chunking::{chunk_document, ChunkDraft, ChunkingOptions};
use crate::collaborators::CollaboratorError;

#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Extracts canonical markdown-like text (headings, paragraphs, lists,
    /// tables, code blocks, images, hyperlinks) from raw source bytes.
    async fn parse(&self, raw: &[u8], content_type: &str) -> Result<String, CollaboratorError>;
}

/// Default double: treats input bytes as already-canonical UTF-8 text
/// (correct for `.md`/`.txt`/`.rst` sources; stands in for a real
/// PDF/DOCX/HTML extractor for everything else in tests).
pub struct IdentityParser;

#[async_trait]
impl DocumentParser for IdentityParser {
    async fn parse(&self, raw: &[u8], _content_type: &str) -> Result<String, CollaboratorError> {
        String::from_utf8(raw.to_vec()).map_err(|e| CollaboratorError::Failed {
            provider: "document_parser",
            message: e.to_string(),
        })
    }
}

static PAGE_NUMBER_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*-?\s*\d{1,4}\s*-?\s*$").unwrap());
static REPEATED_HEADER_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(Page \d+( of \d+)?|Confidential|Draft)\s*$").unwrap());

/// Best-effort cleanup of PDF extraction noise: bare page-number lines and
/// common repeated header/footer boilerplate.
pub fn clean_pdf_artifacts(text: &str) -> String {
    let no_page_numbers = PAGE_NUMBER_LINE.replace_all(text, "");
    let no_headers = REPEATED_HEADER_FOOTER.replace_all(&no_page_numbers, "");
    no_headers
        .lines()
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub chunk_count: usize,
    pub total_tokens: u32,
    pub section_titles: Vec<String>,
}

fn summarize(chunks: &[ChunkDraft]) -> DocumentSummary {
    let mut section_titles: Vec<String> = chunks
        .iter()
        .filter_map(|c| c.section_title.clone())
        .collect();
    section_titles.dedup();
    DocumentSummary {
        chunk_count: chunks.len(),
        total_tokens: chunks.iter().map(|c| c.token_count).sum(),
        section_titles,
    }
}

/// Appends a tail chunk carrying document-level statistics (spec §4.2:
/// "Emits comprehensive-summary chunks at the tail").
fn comprehensive_summary_chunk(chunks: &[ChunkDraft], filename: &str) -> ChunkDraft {
    let summary = summarize(chunks);
    let text = format!(
        "File: {filename} | Section: Document Summary\n\n\
         {count} chunks, {tokens} tokens across {sections} sections: {titles}",
        count = summary.chunk_count,
        tokens = summary.total_tokens,
        sections = summary.section_titles.len(),
        titles = summary.section_titles.join(", "),
    );
    ChunkDraft {
        chunk_index: chunks.len() as u32,
        breadcrumb: format!("File: {filename} | Section: Document Summary"),
        token_count: crate::tokenizer::count_tokens(&text),
        text,
        section_title: Some("Document Summary".to_string()),
    }
}

/// Runs parse → (optional) PDF cleanup → chunk → summary-tail.
pub async fn ingest_documentation(
    parser: &dyn DocumentParser,
    raw: &[u8],
    content_type: &str,
    filename: &str,
    is_pdf: bool,
    options: &ChunkingOptions,
) -> Result<Vec<ChunkDraft>, CollaboratorError> {
    let mut text = parser.parse(raw, content_type).await?;
    if is_pdf {
        text = clean_pdf_artifacts(&text);
    }
    let mut chunks = chunk_document(&text, filename, options);
    if !chunks.is_empty() {
        chunks.push(comprehensive_summary_chunk(&chunks, filename));
    }
    Ok(chunks)
}
