//! The chunking algorithm from spec §4.2.1: code-block placeholdering,
//! H1/H2 section splitting with a tracked heading path, paragraph packing
//! against a token budget, sentence-boundary fallback for oversized
//! paragraphs, and breadcrumb prefixing before emission.

use regex::Regex;
use std::sync::LazyLock;

use crate::tokenizer::count_tokens;

#[derive(Debug, Clone)]
pub struct ChunkingOptions {
    pub max_tokens_per_chunk: u32,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub chunk_index: u32,
    pub breadcrumb: String,
    pub text: String,
    pub token_count: u32,
    pub section_title: Option<String>,
}

static FENCED_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());

struct CodeBlocks {
    placeholders: Vec<String>,
}

impl CodeBlocks {
    fn placeholder(index: usize) -> String {
        format!("\u{0}CODE_BLOCK_{index}\u{0}")
    }

    /// Step 1: extract every fenced code block, replacing it with an opaque
    /// placeholder that survives paragraph/sentence splitting intact (no
    /// embedded blank lines or sentence punctuation).
    fn extract(raw: &str) -> (String, Self) {
        let mut blocks = Vec::new();
        let replaced = FENCED_CODE_BLOCK
            .replace_all(raw, |caps: &regex::Captures| {
                let index = blocks.len();
                blocks.push(caps[0].to_string());
                Self::placeholder(index)
            })
            .into_owned();
        (replaced, Self { placeholders: blocks })
    }

    /// Step 5 (reinsertion half): restores original code block text.
    fn reinsert(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (index, original) in self.placeholders.iter().enumerate() {
            out = out.replace(&Self::placeholder(index), original);
        }
        out
    }
}

struct Section {
    heading_path: Vec<String>,
    body: String,
}

/// Step 2: split by H1/H2 into major sections, tracking the full heading
/// path (H1..H6) seen up to and including each section's own heading.
fn split_into_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading_stack: Vec<(usize, String)> = Vec::new();
    let mut current_body = String::new();
    let mut current_path: Vec<String> = Vec::new();

    let flush = |sections: &mut Vec<Section>, path: &[String], body: &mut String| {
        if !body.trim().is_empty() {
            sections.push(Section {
                heading_path: path.to_vec(),
                body: std::mem::take(body),
            });
        } else {
            body.clear();
        }
    };

    for line in text.lines() {
        if let Some(caps) = HEADING_LINE.captures(line) {
            let level = caps[1].len();
            let title = caps[2].trim().to_string();

            if level <= 2 {
                flush(&mut sections, &current_path, &mut current_body);
            }

            heading_stack.retain(|(l, _)| *l < level);
            heading_stack.push((level, title));
            current_path = heading_stack.iter().map(|(_, t)| t.clone()).collect();

            if level <= 2 {
                continue;
            }
        }
        current_body.push_str(line);
        current_body.push('\n');
    }
    flush(&mut sections, &current_path, &mut current_body);

    if sections.is_empty() {
        sections.push(Section {
            heading_path: Vec::new(),
            body: text.to_string(),
        });
    }
    sections
}

/// Step 3: blank-line-delimited paragraphs. Code-block placeholders never
/// contain blank lines, so they never get split mid-block.
fn split_into_paragraphs(body: &str) -> Vec<String> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Step 4 (sentence fallback): splits an oversized paragraph by sentence
/// boundary (`.`/`!`/`?` followed by whitespace or end-of-text) so it can
/// still be packed against the token budget. The `regex` crate has no
/// look-around support, so this walks bytes directly rather than using a
/// lookbehind-based split pattern.
fn split_into_sentences(paragraph: &str) -> Vec<String> {
    let bytes = paragraph.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        if matches!(c, b'.' | b'!' | b'?') {
            let next = i + 1;
            if next >= bytes.len() || bytes[next].is_ascii_whitespace() {
                sentences.push(paragraph[start..next.min(bytes.len())].trim().to_string());
                let mut skip = next;
                while skip < bytes.len() && bytes[skip].is_ascii_whitespace() {
                    skip += 1;
                }
                start = skip;
                i = skip;
                continue;
            }
        }
        i += 1;
    }
    if start < bytes.len() {
        sentences.push(paragraph[start..].trim().to_string());
    }
    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

struct Packer {
    max_tokens: u32,
    current: String,
    current_tokens: u32,
    out: Vec<String>,
}

impl Packer {
    fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            current: String::new(),
            current_tokens: 0,
            out: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if !self.current.trim().is_empty() {
            self.out.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
        self.current_tokens = 0;
    }

    fn push_unit(&mut self, unit: &str) {
        let unit_tokens = count_tokens(unit);
        if unit_tokens > self.max_tokens {
            // Step 4: flush, then pack this unit's sentences individually.
            self.flush();
            for sentence in split_into_sentences(unit) {
                self.push_unit(&sentence);
            }
            return;
        }
        if self.current_tokens + unit_tokens > self.max_tokens && self.current_tokens > 0 {
            self.flush();
        }
        if !self.current.is_empty() {
            self.current.push_str("\n\n");
        }
        self.current.push_str(unit);
        self.current_tokens += unit_tokens;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }
}

/// Runs the full algorithm, returning chunks in emission order with
/// breadcrumbs already prepended and code blocks reinserted.
pub fn chunk_document(raw: &str, filename: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let (placeheld, code_blocks) = CodeBlocks::extract(raw);
    let sections = split_into_sections(&placeheld);

    let mut drafts = Vec::new();
    let mut chunk_index = 0u32;

    for section in &sections {
        let mut packer = Packer::new(options.max_tokens_per_chunk);
        for paragraph in split_into_paragraphs(&section.body) {
            packer.push_unit(&paragraph);
        }
        let section_title = section.heading_path.last().cloned();
        let breadcrumb = if section.heading_path.is_empty() {
            format!("File: {filename}")
        } else {
            format!("File: {filename} | Section: {}", section.heading_path.join(" > "))
        };

        for packed in packer.finish() {
            let text = format!("{breadcrumb}\n\n{}", code_blocks.reinsert(&packed));
            drafts.push(ChunkDraft {
                chunk_index,
                breadcrumb: breadcrumb.clone(),
                token_count: count_tokens(&text),
                text,
                section_title: section_title.clone(),
            });
            chunk_index += 1;
        }
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_h1_and_h2_but_not_h3() {
        let doc = "# Intro\n\nHello.\n\n## Setup\n\nInstall.\n\n### Details\n\nMore info.\n";
        let drafts = chunk_document(doc, "guide.md", &ChunkingOptions::default());
        assert!(drafts.iter().any(|d| d.breadcrumb.contains("Intro")));
        assert!(drafts.iter().any(|d| d.breadcrumb.contains("Setup")));
        // H3 stays within the "Setup" section's breadcrumb path, not its own section.
        let setup_chunk = drafts.iter().find(|d| d.text.contains("More info")).unwrap();
        assert!(setup_chunk.breadcrumb.contains("Setup"));
    }

    #[test]
    fn code_blocks_survive_paragraph_splitting_intact() {
        let doc = "# Title\n\nSee below:\n\n```rust\nfn main() {\n\n    println!(\"hi\");\n}\n```\n\nDone.";
        let drafts = chunk_document(doc, "code.md", &ChunkingOptions::default());
        let joined: String = drafts.iter().map(|d| d.text.as_str()).collect();
        assert!(joined.contains("fn main()"));
        assert!(joined.contains("println!(\"hi\")"));
    }

    #[test]
    fn oversized_paragraph_is_packed_by_sentence() {
        let long_sentence_paragraph = (0..50)
            .map(|i| format!("This is sentence number {i} in a very long paragraph."))
            .collect::<Vec<_>>()
            .join(" ");
        let doc = format!("# Section\n\n{long_sentence_paragraph}");
        let options = ChunkingOptions {
            max_tokens_per_chunk: 20,
        };
        let drafts = chunk_document(&doc, "long.md", &options);
        assert!(drafts.len() > 1);
        for draft in &drafts {
            assert!(draft.token_count <= 40); // budget + breadcrumb overhead
        }
    }

    #[test]
    fn chunk_index_is_monotonic() {
        let doc = "# A\n\nfoo\n\n# B\n\nbar\n\n# C\n\nbaz\n";
        let drafts = chunk_document(doc, "f.md", &ChunkingOptions::default());
        let indices: Vec<u32> = drafts.iter().map(|d| d.chunk_index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
        assert_eq!(indices.first(), Some(&0));
    }
}
