//! Service layer errors

use gram_core::DomainError;
use gram_media::MediaError;

use super::validator::RejectionReason;

/// Errors produced by the application services
///
/// `Rejected` is the one variant callers branch on: the submission was
/// refused by moderation and the router owes the author a compensation
/// (delete the post, explain why in private). Everything else is a
/// failure of the pipeline itself.
#[derive(Debug)]
pub enum ServiceError {
    /// Moderation refused the submission
    Rejected(RejectionReason),
    /// Domain rule or archive store failure
    Domain(DomainError),
    /// Media pipeline failure
    Media(MediaError),
    /// Task or invariant failure inside a service
    Internal(String),
}

impl ServiceError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The rejection behind this error, when moderation refused the post
    #[must_use]
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Stable code for structured log fields
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected(reason) => reason.code(),
            Self::Domain(error) => error.code(),
            Self::Media(_) => "MEDIA_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "Submission rejected: {reason}"),
            Self::Domain(error) => write!(f, "Domain error: {error}"),
            Self::Media(error) => write!(f, "Media error: {error}"),
            Self::Internal(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(error) => Some(error),
            Self::Media(error) => Some(error),
            Self::Rejected(_) | Self::Internal(_) => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(error: DomainError) -> Self {
        Self::Domain(error)
    }
}

impl From<MediaError> for ServiceError {
    fn from(error: MediaError) -> Self {
        Self::Media(error)
    }
}

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;
