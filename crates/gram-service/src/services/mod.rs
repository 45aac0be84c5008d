//! Business logic services
//!
//! Construction follows one pattern: a service borrows the
//! [`ServiceContext`] and lives for a single gateway event or scheduler
//! tick. Transactions never outlive a method, and anything that must
//! happen after a commit (threads, reactions, role changes) is a separate
//! method so callers decide how its failures are handled.

pub mod context;
pub mod error;
pub mod level;
pub mod notice;
pub mod post;
pub mod profile;
pub mod reconcile;
pub mod render;
pub mod rules;
pub mod streak;
pub mod tag;
pub mod validator;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use level::LevelService;
pub use post::{EditOutcome, IngestOutcome, PostService};
pub use profile::ProfileService;
pub use reconcile::{ReconcileService, ReconcileSummary};
pub use rules::TagRules;
pub use tag::TagService;
pub use validator::RejectionReason;
