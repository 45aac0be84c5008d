//! Extension policy - configured attachment whitelist and kind classification

use crate::entities::AttachmentKind;

/// Immutable whitelist of allowed attachment extensions, split by kind.
///
/// Extensions are stored lowercased with a leading dot. A filename whose
/// extension appears in no list classifies as [`AttachmentKind::Unknown`]
/// and fails the whitelist check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    image: Vec<String>,
    video: Vec<String>,
    audio: Vec<String>,
}

impl ExtensionPolicy {
    /// Create a policy from raw extension lists
    pub fn new(image: Vec<String>, video: Vec<String>, audio: Vec<String>) -> Self {
        Self {
            image: normalize(image),
            video: normalize(video),
            audio: normalize(audio),
        }
    }

    /// Classify a filename by its extension
    pub fn classify(&self, filename: &str) -> AttachmentKind {
        match extension_of(filename) {
            Some(ext) if self.image.contains(&ext) => AttachmentKind::Image,
            Some(ext) if self.video.contains(&ext) => AttachmentKind::Video,
            Some(ext) if self.audio.contains(&ext) => AttachmentKind::Audio,
            _ => AttachmentKind::Unknown,
        }
    }

    /// Check whether a filename's extension is in any allowed list
    pub fn is_allowed(&self, filename: &str) -> bool {
        self.classify(filename) != AttachmentKind::Unknown
    }
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::new(
            vec![".png".into(), ".jpg".into(), ".jpeg".into(), ".gif".into()],
            vec![".mp4".into(), ".mov".into(), ".avi".into()],
            vec![".mp3".into(), ".wav".into(), ".ogg".into()],
        )
    }
}

fn normalize(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| {
            let e = e.trim().to_lowercase();
            if e.starts_with('.') {
                e
            } else {
                format!(".{e}")
            }
        })
        .filter(|e| e.len() > 1)
        .collect()
}

/// Extract the lowercased extension (with dot) from a filename
fn extension_of(filename: &str) -> Option<String> {
    let idx = filename.rfind('.')?;
    if idx == 0 || idx + 1 == filename.len() {
        return None;
    }
    Some(filename[idx..].to_lowercase())
}
