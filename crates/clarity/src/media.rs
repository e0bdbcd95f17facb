// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading media files given on the command line.
//!
//! Files are checked against the `[uploads]` limits before any dispatch so
//! that the engine only ever sees attachments the user meant to send.

use std::path::{Path, PathBuf};

use clarity_config::model::UploadsConfig;
use clarity_core::{ClarityError, MediaAttachment, MediaKind, MediaPayload};
use tracing::debug;

/// Lowercased extension of `name`, without the dot.
fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME type for a video file name. Unknown extensions are sent as MP4.
pub fn video_mime(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        _ => "video/mp4",
    }
}

/// MIME type for an audio file name. Unknown extensions are sent as MP3.
pub fn audio_mime(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        _ => "audio/mpeg",
    }
}

/// MIME type for an image, or `None` if the extension is not allowed.
pub fn image_mime(name: &str, allowed: &[String]) -> Option<&'static str> {
    let ext = extension(name)?;
    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        return None;
    }
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Media paths collected from the command line.
#[derive(Debug, Default, Clone)]
pub struct MediaArgs {
    pub images: Vec<PathBuf>,
    pub video: Option<PathBuf>,
    pub audio: Option<PathBuf>,
}

/// Read and validate every file in `args`, in image, video, audio order.
pub async fn load_attachments(
    args: &MediaArgs,
    limits: &UploadsConfig,
) -> Result<Vec<MediaAttachment>, ClarityError> {
    let mut attachments = Vec::new();

    for path in &args.images {
        attachments.push(load_one(path, MediaKind::Image, limits).await?);
    }
    if let Some(path) = &args.video {
        attachments.push(load_one(path, MediaKind::Video, limits).await?);
    }
    if let Some(path) = &args.audio {
        attachments.push(load_one(path, MediaKind::Audio, limits).await?);
    }

    Ok(attachments)
}

async fn load_one(
    path: &Path,
    kind: MediaKind,
    limits: &UploadsConfig,
) -> Result<MediaAttachment, ClarityError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string();
    let reject = |message: String| ClarityError::Media {
        name: name.clone(),
        message,
    };

    let mime = match kind {
        MediaKind::Image => image_mime(&name, &limits.image_extensions).ok_or_else(|| {
            reject(format!(
                "unsupported image type; allowed: {}",
                limits.image_extensions.join(", ")
            ))
        })?,
        MediaKind::Video => video_mime(&name),
        MediaKind::Audio => audio_mime(&name),
    };

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| reject(format!("cannot read {}: {e}", path.display())))?
        .len();
    if size > limits.max_file_size_bytes() {
        return Err(reject(format!(
            "file is {:.1} MB, limit is {} MB",
            size as f64 / (1024.0 * 1024.0),
            limits.max_file_size_mb
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| reject(format!("cannot read {}: {e}", path.display())))?;

    debug!(attachment = %name, %kind, mime, size, "media loaded");

    let payload = MediaPayload::new(bytes, mime, name.clone());
    Ok(match kind {
        MediaKind::Image => MediaAttachment::Image(payload),
        MediaKind::Video => MediaAttachment::Video(payload),
        MediaKind::Audio => MediaAttachment::Audio(payload),
    })
}
