//! Failures surfaced by the domain ports

mod domain_error;

pub use domain_error::DomainError;
