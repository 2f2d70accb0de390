//! Capability domains (fatigue, risk, tactical) behind one contract.
//!
//! - **capability**: the `Capability` trait and the injectable `CapabilitySet`
//! - **rules**: deterministic runners, also used as fallback builders
//! - **llm_runner**: chat-completion-backed runners with rule fallbacks
//! - **config**: builds a `CapabilitySet` from process configuration

pub mod capability;
pub mod config;
pub mod executor;
pub mod llm_runner;
pub mod rules;
pub mod types;

pub use capability::{Capability, CapabilityError, CapabilitySet};
pub use config::build_capabilities;
pub use executor::PromptExecutor;
pub use llm_runner::LlmRunner;
pub use types::*;
