//! # gram-media
//!
//! Media pipeline primitives: mirroring remote files to disk and deriving
//! the artifacts the archive serves alongside them.
//!
//! ## Overview
//!
//! - [`fetch`] - the HTTP mirror port and its reqwest implementation
//! - [`thumbnail`] - 500x500-bounded JPEG thumbnails and the play glyph
//! - [`video`] - first-frame extraction through an ffmpeg subprocess
//! - [`badge`] - numeric level-role icons rendered from a template
//!
//! Everything here is path-based and free of domain types; callers decide
//! which files an attachment needs and what a missing one means.

pub mod badge;
pub mod error;
pub mod fetch;
pub mod thumbnail;
pub mod video;

pub use badge::BadgeRenderer;
pub use error::MediaError;
pub use fetch::{Fetcher, HttpFetcher};
pub use thumbnail::{composite_play_glyph, derive_image_thumbnail};
pub use video::extract_first_frame;
