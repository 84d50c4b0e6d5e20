//! Handlers for the `/analyses` resource.
//!
//! A video upload creates one analysis job; the job id is returned
//! immediately and the caller polls for the result.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use coverdrive_pipeline::detect::SidecarPoseDetector;
use coverdrive_pipeline::job::{AnalysisJob, JobId, JobStatus};
use coverdrive_pipeline::source::FfmpegFrameSource;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Upload extensions accepted as-is; anything else is stored as `.mp4`.
const KNOWN_EXTENSIONS: [&str; 4] = [".mp4", ".avi", ".mov", ".mkv"];

/// Response body for a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub analysis_id: JobId,
    pub status: JobStatus,
    pub message: &'static str,
}

/// POST /api/v1/analyses
///
/// Multipart upload with a `file` field holding the video. Returns 202
/// with the job id; processing continues in the background.
pub async fn submit_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("video/") {
            return Err(AppError::BadRequest("File must be a video".into()));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded video is empty".into()));
    }

    let extension = normalized_extension(&file_name);
    let video_path = state
        .config
        .upload_dir
        .join(format!("uploaded_{}{extension}", uuid::Uuid::new_v4()));

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("cannot create upload directory: {e}")))?;
    tokio::fs::write(&video_path, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("cannot store upload: {e}")))?;

    let source = FfmpegFrameSource::new(&video_path);
    let detector = SidecarPoseDetector::new(&state.config.pose_command);
    let analysis_id = state
        .engine
        .submit(source, detector)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(
        analysis_id = %analysis_id,
        file_name = %file_name,
        bytes = bytes.len(),
        "Video uploaded, analysis started",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            analysis_id,
            status: JobStatus::Pending,
            message: "Video uploaded successfully. Analysis started.",
        }),
    ))
}

/// GET /api/v1/analyses/{id}
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> AppResult<Json<AnalysisJob>> {
    let job = state.engine.get_status(id).await?;
    Ok(Json(job))
}

/// GET /api/v1/analyses
pub async fn list_analyses(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AnalysisJob>>> {
    let jobs = state
        .engine
        .list_jobs()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(jobs))
}

/// Lowercased extension of the uploaded file, defaulting to `.mp4` when
/// missing or unrecognized.
fn normalized_extension(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    KNOWN_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .copied()
        .unwrap_or(".mp4")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_pass_through() {
        assert_eq!(normalized_extension("clip.mp4"), ".mp4");
        assert_eq!(normalized_extension("CLIP.MOV"), ".mov");
        assert_eq!(normalized_extension("drive.mkv"), ".mkv");
        assert_eq!(normalized_extension("old.avi"), ".avi");
    }

    #[test]
    fn unknown_extensions_default_to_mp4() {
        assert_eq!(normalized_extension("clip.webm"), ".mp4");
        assert_eq!(normalized_extension("noextension"), ".mp4");
        assert_eq!(normalized_extension(""), ".mp4");
    }
}
