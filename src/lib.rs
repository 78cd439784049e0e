//! Forwards text and images to AWS Bedrock models and decodes what comes back.
//!
//! [`ModelAdapter`] is the core: it builds provider-specific request bodies, ships
//! them through a [`ModelInvoker`], and turns the response envelope into text or
//! image bytes. [`PromptTemplate`] renders the fixed prompts sent to text models.

pub mod adapter;
pub mod ai_backend;
pub mod command;
pub mod constants;
pub mod error;
pub mod media;
pub mod payload;
pub mod prompt;
pub mod settings;
pub mod staging;

pub use adapter::{
    AdapterConfig, ImageGenerationParams, InvocationRequest, InvocationResult, ModelAdapter,
    TextModelFamily, VisionParams,
};
pub use ai_backend::{BedrockInvoker, ModelInvoker};
pub use command::{AiStudio, AiStudioArgs};
pub use error::{AdapterError, DecodeError, InvocationError, TaskKind, TemplateError};
pub use prompt::{PromptTemplate, RenderedPrompt};
pub use settings::Settings;
pub use staging::StagedImageFile;
