//! Submission moderation
//!
//! The gate every submission passes before any fetch or write happens.
//! Create and edit run the same checks: a post must carry text and at
//! least one attachment, and every attachment extension must be on the
//! configured whitelist.

use gram_core::{ExtensionPolicy, IncomingAttachment};

/// Why moderation refused a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Empty text, or no attachments at all
    MissingContent,
    /// At least one attachment has a non-whitelisted extension
    DisallowedType,
}

impl RejectionReason {
    /// Stable code for structured log fields
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingContent => "MISSING_CONTENT",
            Self::DisallowedType => "DISALLOWED_TYPE",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContent => write!(f, "post must carry text and at least one attachment"),
            Self::DisallowedType => write!(f, "an attachment has a disallowed file type"),
        }
    }
}

/// Check a submission against the moderation rules
pub fn validate(
    content: &str,
    attachments: &[IncomingAttachment],
    policy: &ExtensionPolicy,
) -> Result<(), RejectionReason> {
    if content.trim().is_empty() || attachments.is_empty() {
        return Err(RejectionReason::MissingContent);
    }

    if attachments.iter().any(|a| !policy.is_allowed(&a.filename)) {
        return Err(RejectionReason::DisallowedType);
    }

    Ok(())
}
