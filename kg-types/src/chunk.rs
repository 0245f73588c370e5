//! Content chunks produced by ingestion and the ingestion run record that
//! tracks how a source was turned into chunks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::impl_entity;

/// The base material a chunk was carved from, independent of whether it is a
/// tail-of-document comprehensive summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Documentation,
    Webpage,
    Exploration,
    VideoTranscription,
    VideoFrameAnalysis,
    VideoAction,
}

impl ChunkKind {
    fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Documentation => "documentation",
            ChunkKind::Webpage => "webpage",
            ChunkKind::Exploration => "exploration",
            ChunkKind::VideoTranscription => "video_transcription",
            ChunkKind::VideoFrameAnalysis => "video_frame_analysis",
            ChunkKind::VideoAction => "video_action",
        }
    }
}

/// `chunk_type` as a sum type: one of the six base kinds, optionally marked
/// as a comprehensive-summary chunk (the spec's `*_summary` wildcard, e.g.
/// `documentation_summary`) emitted at the tail of a source's chunk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkType {
    pub kind: ChunkKind,
    pub is_summary: bool,
}

impl ChunkType {
    pub const fn new(kind: ChunkKind) -> Self {
        Self {
            kind,
            is_summary: false,
        }
    }

    pub const fn summary_of(kind: ChunkKind) -> Self {
        Self {
            kind,
            is_summary: true,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_summary {
            write!(f, "{}_summary", self.kind.as_str())
        } else {
            write!(f, "{}", self.kind.as_str())
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized chunk_type: {0}")]
pub struct ParseChunkTypeError(String);

impl FromStr for ChunkType {
    type Err = ParseChunkTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, is_summary) = match s.strip_suffix("_summary") {
            Some(base) => (base, true),
            None => (s, false),
        };
        let kind = match base {
            "documentation" => ChunkKind::Documentation,
            "webpage" => ChunkKind::Webpage,
            "exploration" => ChunkKind::Exploration,
            "video_transcription" => ChunkKind::VideoTranscription,
            "video_frame_analysis" => ChunkKind::VideoFrameAnalysis,
            "video_action" => ChunkKind::VideoAction,
            _ => return Err(ParseChunkTypeError(s.to_string())),
        };
        Ok(Self { kind, is_summary })
    }
}

impl Serialize for ChunkType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChunkType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ChunkType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A single packed unit of text handed to the extraction phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub chunk_index: u32,
    pub content: String,
    pub token_count: u32,
    pub chunk_type: ChunkType,
    #[serde(default)]
    pub section_title: Option<String>,
    /// "File: <name> | Section: <heading path>" style prefix prepended to `content`.
    #[serde(default)]
    pub breadcrumb: String,
    #[serde(default)]
    pub code_block_placeholders: Vec<String>,
}

impl_entity!(ContentChunk);

/// Envelope for all chunks produced from one source, created atomically at
/// ingest completion. Looked up by content hash for idempotent re-ingestion
/// (§4.9 ingestion dedup contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub ingestion_id: String,
    pub source_type: String,
    pub source_metadata: serde_json::Value,
    pub chunk_ids: Vec<String>,
    pub total_tokens: u32,
    #[serde(default)]
    pub errors: Vec<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub success: bool,
}

impl_entity!(IngestionResult);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_type_round_trips_through_display_and_parse() {
        for ct in [
            ChunkType::new(ChunkKind::Documentation),
            ChunkType::summary_of(ChunkKind::Webpage),
            ChunkType::new(ChunkKind::VideoFrameAnalysis),
            ChunkType::summary_of(ChunkKind::VideoAction),
        ] {
            let parsed: ChunkType = ct.to_string().parse().unwrap();
            assert_eq!(parsed, ct);
        }
    }

    #[test]
    fn chunk_type_rejects_unknown_strings() {
        assert!("not_a_real_kind".parse::<ChunkType>().is_err());
    }
}
