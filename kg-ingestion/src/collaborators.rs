//! External collaborators the ingestion crate depends on as black-box
//! traits (spec §1 Non-goals: no real network/vision/browser code is
//! implemented here). Each trait ships an in-memory test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{provider}: {message}")]
    Failed { provider: &'static str, message: String },
}

/// A fetched page: raw bytes plus enough metadata for the crawler and
/// documentation ingester to decide what to do next.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub html: String,
    pub status: u16,
}

/// Abstracts the headless browser used by the site crawler and the URL
/// Exploration phase. A real implementation would drive a browser; the
/// in-memory double serves canned pages keyed by URL.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CollaboratorError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Abstracts the speech-to-text collaborator used by the video sub-pipeline
/// (spec §4.3 Phase A).
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    async fn transcribe(&self, video_path: &str) -> Result<Vec<TranscriptSegment>, CollaboratorError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub timestamp_ms: u64,
    pub description: String,
    pub detected_actions: Vec<String>,
}

/// Abstracts the vision-LLM collaborator used by the video sub-pipeline's
/// batched analysis phase (spec §4.3 Phase B).
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn analyze_frames(
        &self,
        frame_refs: &[String],
    ) -> Result<Vec<FrameAnalysis>, CollaboratorError>;
}

/// Abstracts the object store used for the video pipeline's Claim Check
/// pattern: batch activities write their result and return only a key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), CollaboratorError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CollaboratorError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_ms: u64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

/// A single decoded frame: a perceptual hash for dedup plus enough metadata
/// to decide whether it clears the minimum-resolution floor. `frame_ref` is
/// the opaque reference later written through to the object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    pub frame_ref: String,
    pub timestamp_ms: u64,
    pub width: u32,
    pub height: u32,
    pub phash: u64,
}

/// Abstracts video decoding: extracting frames at a configured interval and
/// the container-level metadata. Like transcription and vision, frame
/// decoding requires a real codec and is out of scope (spec §1); this trait
/// exists only to make the boundary explicit and testable.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract_frames(
        &self,
        video_path: &str,
    ) -> Result<(Vec<RawFrame>, VideoMetadata), CollaboratorError>;
}

pub mod doubles {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryBrowserDriver {
        pages: RwLock<HashMap<String, FetchedPage>>,
    }

    impl InMemoryBrowserDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, url: impl Into<String>, page: FetchedPage) {
            self.pages.write().unwrap().insert(url.into(), page);
        }
    }

    #[async_trait]
    impl BrowserDriver for InMemoryBrowserDriver {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, CollaboratorError> {
            self.pages
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| CollaboratorError::Failed {
                    provider: "browser_driver",
                    message: format!("no page seeded for {url}"),
                })
        }
    }

    #[derive(Default)]
    pub struct InMemoryTranscriptionClient {
        transcripts: RwLock<HashMap<String, Vec<TranscriptSegment>>>,
    }

    impl InMemoryTranscriptionClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, video_path: impl Into<String>, segments: Vec<TranscriptSegment>) {
            self.transcripts.write().unwrap().insert(video_path.into(), segments);
        }
    }

    #[async_trait]
    impl TranscriptionClient for InMemoryTranscriptionClient {
        async fn transcribe(&self, video_path: &str) -> Result<Vec<TranscriptSegment>, CollaboratorError> {
            Ok(self
                .transcripts
                .read()
                .unwrap()
                .get(video_path)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[derive(Default)]
    pub struct InMemoryVisionClient {
        analyses: RwLock<HashMap<String, FrameAnalysis>>,
    }

    impl InMemoryVisionClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, frame_ref: impl Into<String>, analysis: FrameAnalysis) {
            self.analyses.write().unwrap().insert(frame_ref.into(), analysis);
        }
    }

    #[async_trait]
    impl VisionClient for InMemoryVisionClient {
        async fn analyze_frames(&self, frame_refs: &[String]) -> Result<Vec<FrameAnalysis>, CollaboratorError> {
            let analyses = self.analyses.read().unwrap();
            Ok(frame_refs
                .iter()
                .filter_map(|r| analyses.get(r).cloned())
                .collect())
        }
    }

    #[derive(Default)]
    pub struct InMemoryObjectStore {
        objects: RwLock<HashMap<String, Vec<u8>>>,
    }

    impl InMemoryObjectStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ObjectStore for InMemoryObjectStore {
        async fn put(&self, key: &str, value: &[u8]) -> Result<(), CollaboratorError> {
            self.objects.write().unwrap().insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CollaboratorError> {
            Ok(self.objects.read().unwrap().get(key).cloned())
        }
    }

    #[derive(Default)]
    pub struct InMemoryFrameExtractor {
        videos: RwLock<HashMap<String, (Vec<RawFrame>, VideoMetadata)>>,
    }

    impl InMemoryFrameExtractor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, video_path: impl Into<String>, frames: Vec<RawFrame>, metadata: VideoMetadata) {
            self.videos.write().unwrap().insert(video_path.into(), (frames, metadata));
        }
    }

    #[async_trait]
    impl FrameExtractor for InMemoryFrameExtractor {
        async fn extract_frames(
            &self,
            video_path: &str,
        ) -> Result<(Vec<RawFrame>, VideoMetadata), CollaboratorError> {
            self.videos
                .read()
                .unwrap()
                .get(video_path)
                .cloned()
                .ok_or_else(|| CollaboratorError::Failed {
                    provider: "frame_extractor",
                    message: format!("no frames seeded for {video_path}"),
                })
        }
    }
}
