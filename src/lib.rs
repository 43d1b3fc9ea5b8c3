//! Core dispatch library for a multi-provider AI chat front end.
//!
//! Routes a user's message, a selected task, and a provider/model pair into
//! one completion request against an OpenAI-compatible endpoint, returning
//! the formatted response or a classified error string:
//! - [`config`] loads provider declarations from YAML and the environment.
//! - [`registry`] resolves provider names to connection settings and models.
//! - [`prompts`] maps task names to fixed two-message prompt templates.
//! - [`llm`] holds the wire types and the completion client.
//! - [`image`] encodes image files as data URLs for vision requests.
//! - [`dispatcher`] ties it all together behind one string-returning surface.

pub mod config;
pub mod dispatcher;
pub mod image;
pub mod llm;
pub mod prompts;
pub mod registry;

pub use config::{Config, ConfigError};
pub use dispatcher::{DEFAULT_TIMEOUT, ClientFactory, DispatchError, TaskDispatcher, TaskRequest};
pub use registry::{ProviderRegistry, ProviderSettings};
