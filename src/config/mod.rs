//! Configuration module for Lectio.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GenerationPrompts, Prompts};
pub use settings::{
    GeneralSettings, PipelineSettings, PromptSettings, ProviderKind, ProviderSettings,
    Settings, StorageKind, StorageSettings, TranscriberKind, TranscriptionSettings,
};
