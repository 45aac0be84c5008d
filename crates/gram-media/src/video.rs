//! First-frame extraction for video attachments
//!
//! Shells out to ffmpeg rather than binding a decoder; the binary is
//! configurable and the subprocess contains any codec crash.

use std::path::Path;

use tokio::process::Command;

use crate::error::MediaError;

/// Extract the first frame of `video` into `dest` (encoded by extension)
pub async fn extract_first_frame(
    ffmpeg: &str,
    video: &Path,
    dest: &Path,
) -> Result<(), MediaError> {
    let output = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(video)
        .arg("-vframes")
        .arg("1")
        .arg(dest)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.lines().last().unwrap_or("no output").to_string();
        return Err(MediaError::Ffmpeg {
            path: video.display().to_string(),
            detail,
        });
    }

    Ok(())
}
