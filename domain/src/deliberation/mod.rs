//! Deliberation subdomain
//!
//! Request/response surface of the engine and the round accumulator:
//!
//! - [`request::DeliberationRequest`] — immutable per-call input
//! - [`result::DeliberationResult`] — terminal artifact for the caller
//! - [`round::RoundState`] — value-passed accumulator for the round loop

pub mod request;
pub mod result;
pub mod round;

pub use request::{
    positional_labels, Attachment, AttachmentKind, DeliberationRequest, ModelSpec, Outcomes,
};
pub use result::{DeliberationResult, OutcomeScore};
pub use round::{ModelBallot, RoundState};
