//! Progress reporting implementations

mod reporter;

pub use reporter::{ProgressReporter, SimpleProgress};
