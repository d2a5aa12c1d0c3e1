//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — request validation errors

pub mod error;
