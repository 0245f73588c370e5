//! Video sub-pipeline (spec §4.3): Phase A fans transcription and frame
//! filtering out in parallel, Phase B batches filtered frames through the
//! vision collaborator ten at a time using the Claim Check pattern (only an
//! object-store key crosses the batch boundary), and Phase C assembles the
//! joined result into a chunk set. Failures degrade rather than abort: a
//! failed transcription proceeds frames-only, a failed batch drops only its
//! own frames, and an empty filtered-frame list still runs assembly.

use std::collections::HashMap;

use crate::collaborators::{
    CollaboratorError, FrameExtractor, ObjectStore, RawFrame, TranscriptSegment,
    TranscriptionClient, VideoMetadata, VisionClient,
};

const BATCH_SIZE: usize = 10;
const MIN_FRAME_DIMENSION: u32 = 50;
/// Hamming distance (out of 64 bits) below which two frames are treated as
/// near-duplicates. An implementation detail of the pHash comparison, not a
/// tunable the spec names explicitly.
const PHASH_DUPLICATE_THRESHOLD: u32 = 6;

#[derive(Debug, Clone)]
pub enum VideoChunkKind {
    Transcription,
    FrameAnalysis,
    Action,
    Summary,
}

#[derive(Debug, Clone)]
pub struct VideoChunkDraft {
    pub kind: VideoChunkKind,
    pub breadcrumb: String,
    pub text: String,
    pub timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct VideoIngestionOutput {
    pub chunks: Vec<VideoChunkDraft>,
    pub metadata: VideoMetadata,
    pub transcription_failed: bool,
    pub frames_considered: usize,
    pub frames_kept: usize,
    pub batches_failed: usize,
}

fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

struct FilteredFrames {
    filtered_frames: Vec<RawFrame>,
    all_frames: Vec<RawFrame>,
    /// duplicate frame_ref -> canonical keeper frame_ref
    duplicate_map: HashMap<String, String>,
}

/// Phase A (frame half): drops sub-minimum-resolution frames, then drops
/// near-duplicates by pHash distance against the previously kept frame,
/// recording each dropped frame's canonical keeper.
fn filter_frames(frames: Vec<RawFrame>) -> FilteredFrames {
    let all_frames = frames.clone();
    let mut filtered = Vec::new();
    let mut duplicate_map = HashMap::new();
    let mut keeper: Option<&RawFrame> = None;

    let above_resolution: Vec<&RawFrame> = frames
        .iter()
        .filter(|f| f.width >= MIN_FRAME_DIMENSION && f.height >= MIN_FRAME_DIMENSION)
        .collect();

    for frame in &above_resolution {
        match keeper {
            Some(prev) if hamming_distance(prev.phash, frame.phash) <= PHASH_DUPLICATE_THRESHOLD => {
                duplicate_map.insert(frame.frame_ref.clone(), prev.frame_ref.clone());
            }
            _ => {
                filtered.push((*frame).clone());
                keeper = Some(frame);
            }
        }
    }

    FilteredFrames {
        filtered_frames: filtered,
        all_frames,
        duplicate_map,
    }
}

async fn phase_a(
    transcription: &dyn TranscriptionClient,
    frame_extractor: &dyn FrameExtractor,
    video_path: &str,
) -> Result<(Option<Vec<TranscriptSegment>>, FilteredFrames, VideoMetadata), CollaboratorError> {
    let (transcript_result, frames_result) = tokio::join!(
        transcription.transcribe(video_path),
        frame_extractor.extract_frames(video_path),
    );

    let (raw_frames, metadata) = frames_result?;
    let transcript = match transcript_result {
        Ok(segments) => Some(segments),
        Err(_) => None, // degrade: continue with frames alone
    };

    Ok((transcript, filter_frames(raw_frames), metadata))
}

/// Phase B: sequential batches of ten, each batch internally parallel across
/// its own frames. Persists each batch's analyses under a Claim Check key
/// and returns the surviving keys (a failed batch is dropped, not retried).
async fn phase_b(
    filtered_frames: &[RawFrame],
    vision: &dyn VisionClient,
    object_store: &dyn ObjectStore,
    results_prefix: &str,
) -> (Vec<String>, usize) {
    let mut batch_keys = Vec::new();
    let mut failures = 0;

    for (batch_index, batch) in filtered_frames.chunks(BATCH_SIZE).enumerate() {
        let frame_refs: Vec<String> = batch.iter().map(|f| f.frame_ref.clone()).collect();
        let analyses = match vision.analyze_frames(&frame_refs).await {
            Ok(analyses) => analyses,
            Err(_) => {
                failures += 1;
                continue;
            }
        };
        // Test-double vision clients return analyses in request order; keyed
        // storage lets Phase C resolve duplicate expansion by frame_ref.
        let keyed: HashMap<String, crate::collaborators::FrameAnalysis> = frame_refs
            .iter()
            .cloned()
            .zip(analyses)
            .collect();
        let payload = match serde_json::to_vec(&keyed) {
            Ok(bytes) => bytes,
            Err(_) => {
                failures += 1;
                continue;
            }
        };
        let key = format!("{results_prefix}/batch_{batch_index}.json");
        if object_store.put(&key, &payload).await.is_err() {
            failures += 1;
            continue;
        }
        batch_keys.push(key);
    }

    (batch_keys, failures)
}

/// Phase C: reads every batch-result key back, expands duplicate frames onto
/// their canonical analysis (attributed at the duplicate's own timestamp),
/// and joins with the transcription into the final chunk set. Runs even when
/// `filtered_frames` was empty so transcription-only results still persist.
async fn phase_c(
    batch_keys: &[String],
    duplicate_map: &HashMap<String, String>,
    all_frames: &[RawFrame],
    transcript: Option<&[TranscriptSegment]>,
    object_store: &dyn ObjectStore,
) -> Vec<VideoChunkDraft> {
    let mut chunks = Vec::new();

    if let Some(segments) = transcript {
        for segment in segments {
            chunks.push(VideoChunkDraft {
                kind: VideoChunkKind::Transcription,
                breadcrumb: format!("Transcript @ {}ms", segment.start_ms),
                text: segment.text.clone(),
                timestamp_ms: Some(segment.start_ms),
            });
        }
    }

    let mut analyses_by_ref: HashMap<String, crate::collaborators::FrameAnalysis> = HashMap::new();
    for key in batch_keys {
        let Ok(Some(bytes)) = object_store.get(key).await else {
            continue;
        };
        let Ok(keyed) =
            serde_json::from_slice::<HashMap<String, crate::collaborators::FrameAnalysis>>(&bytes)
        else {
            continue;
        };
        analyses_by_ref.extend(keyed);
    }

    let timestamp_of: HashMap<&str, u64> = all_frames
        .iter()
        .map(|f| (f.frame_ref.as_str(), f.timestamp_ms))
        .collect();

    for (frame_ref, analysis) in &analyses_by_ref {
        chunks.push(VideoChunkDraft {
            kind: VideoChunkKind::FrameAnalysis,
            breadcrumb: format!("Frame @ {}ms", analysis.timestamp_ms),
            text: analysis.description.clone(),
            timestamp_ms: Some(analysis.timestamp_ms),
        });
        for action in &analysis.detected_actions {
            chunks.push(VideoChunkDraft {
                kind: VideoChunkKind::Action,
                breadcrumb: format!("Action @ {}ms", analysis.timestamp_ms),
                text: action.clone(),
                timestamp_ms: Some(analysis.timestamp_ms),
            });
        }
        // Expand this canonical analysis onto every frame that deduped to it.
        for (dup_ref, keeper_ref) in duplicate_map {
            if keeper_ref != frame_ref {
                continue;
            }
            let dup_ts = timestamp_of.get(dup_ref.as_str()).copied().unwrap_or(analysis.timestamp_ms);
            chunks.push(VideoChunkDraft {
                kind: VideoChunkKind::FrameAnalysis,
                breadcrumb: format!("Frame @ {dup_ts}ms (duplicate of {}ms)", analysis.timestamp_ms),
                text: analysis.description.clone(),
                timestamp_ms: Some(dup_ts),
            });
        }
    }

    chunks.sort_by_key(|c| c.timestamp_ms.unwrap_or(0));
    chunks
}

fn summary_chunk(output: &VideoIngestionOutput) -> VideoChunkDraft {
    let text = format!(
        "Video summary: {duration}ms, {w}x{h} {codec}, {kept}/{considered} frames kept, {failed} batch(es) failed{transcription_note}",
        duration = output.metadata.duration_ms,
        w = output.metadata.width,
        h = output.metadata.height,
        codec = output.metadata.codec,
        kept = output.frames_kept,
        considered = output.frames_considered,
        failed = output.batches_failed,
        transcription_note = if output.transcription_failed {
            ", transcription failed"
        } else {
            ""
        },
    );
    VideoChunkDraft {
        kind: VideoChunkKind::Summary,
        breadcrumb: "Video Summary".to_string(),
        text,
        timestamp_ms: None,
    }
}

pub async fn ingest_video(
    video_path: &str,
    transcription: &dyn TranscriptionClient,
    frame_extractor: &dyn FrameExtractor,
    vision: &dyn VisionClient,
    object_store: &dyn ObjectStore,
    results_prefix: &str,
) -> Result<VideoIngestionOutput, CollaboratorError> {
    let (transcript, filtered, metadata) = phase_a(transcription, frame_extractor, video_path).await?;
    let frames_considered = filtered.all_frames.len();
    let frames_kept = filtered.filtered_frames.len();

    let (batch_keys, batches_failed) =
        phase_b(&filtered.filtered_frames, vision, object_store, results_prefix).await;

    let mut chunks = phase_c(
        &batch_keys,
        &filtered.duplicate_map,
        &filtered.all_frames,
        transcript.as_deref(),
        object_store,
    )
    .await;

    let mut output = VideoIngestionOutput {
        chunks: Vec::new(),
        metadata,
        transcription_failed: transcript.is_none(),
        frames_considered,
        frames_kept,
        batches_failed,
    };
    chunks.push(summary_chunk(&output));
    output.chunks = chunks;
    Ok(output)
}
