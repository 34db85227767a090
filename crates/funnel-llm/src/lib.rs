//! `funnel-llm`: language-model plumbing for the funnel planner.
//!
//! Talks to any OpenAI-compatible `chat/completions` endpoint and exposes two
//! seams the rest of the workspace depends on:
//!
//! ```text
//! ChatClient ──► LlmCopyWriter          (impl CopyWriter)
//!            └─► LlmSuggestionGenerator (impl funnel_core SuggestionGenerator)
//! ```
//!
//! The copy endpoint in `funnel-server` proxies through a [`CopyWriter`], and
//! the CLI's `suggest` commands hand an [`LlmSuggestionGenerator`] to
//! `funnel_core::suggestion::fetch`.

pub mod client;
pub mod copy;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod types;

pub use client::ChatClient;
pub use copy::{CopyAsset, CopyRequest, CopyWriter, LlmCopyWriter, PersonaInput};
pub use error::LlmError;
pub use generator::LlmSuggestionGenerator;
