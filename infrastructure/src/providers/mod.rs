//! Connector adapters
//!
//! Implementations of the application layer's [`Connector`] port family.
//!
//! [`Connector`]: conclave_application::Connector

mod openai_compat;

pub use openai_compat::OpenAiCompatConnector;
