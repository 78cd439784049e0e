use std::path::Path;

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai_backend::ModelInvoker;
use crate::constants::{
    DEFAULT_ANTHROPIC_VERSION, DEFAULT_IMAGE_MODEL_ID, DEFAULT_INSTRUCTION, DEFAULT_TEXT_MODEL_ID,
    DEFAULT_VISION_MODEL_ID, VISION_SYSTEM_PROMPT,
};
use crate::error::{AdapterError, InvocationError, TaskKind};
use crate::media;
use crate::payload::{
    self, ContentPart, ImageGenerationBody, ImageSource, LlamaBody, Message, MessagesBody,
    TextPrompt, TitanTextBody,
};
use crate::prompt::RenderedPrompt;
use crate::staging::StagedImageFile;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageGenerationParams {
    pub cfg_scale: u32,
    pub steps: u32,
}

impl Default for ImageGenerationParams {
    fn default() -> Self {
        Self {
            cfg_scale: 9,
            steps: 50,
        }
    }
}

/// Parameters for Anthropic messages requests.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionParams {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            max_tokens: 1000,
            temperature: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub text_model_id: String,
    pub image_model_id: String,
    pub vision_model_id: String,
    pub image_generation: ImageGenerationParams,
    pub vision: VisionParams,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            text_model_id: DEFAULT_TEXT_MODEL_ID.to_string(),
            image_model_id: DEFAULT_IMAGE_MODEL_ID.to_string(),
            vision_model_id: DEFAULT_VISION_MODEL_ID.to_string(),
            image_generation: ImageGenerationParams::default(),
            vision: VisionParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InvocationRequest {
    TextAnalysis {
        prompt: RenderedPrompt,
        model_id: String,
    },
    ImageGeneration {
        scene: String,
        style: String,
    },
    ImageDescription {
        image: Vec<u8>,
        media_type: String,
        instruction: String,
    },
}

impl InvocationRequest {
    pub fn task(&self) -> TaskKind {
        match self {
            InvocationRequest::TextAnalysis { .. } => TaskKind::TextAnalysis,
            InvocationRequest::ImageGeneration { .. } => TaskKind::ImageGeneration,
            InvocationRequest::ImageDescription { .. } => TaskKind::ImageDescription,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InvocationResult {
    Text(String),
    Image {
        bytes: Vec<u8>,
        format: Option<ImageFormat>,
    },
}

/// Request body family for a text model, chosen from the model id's provider prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextModelFamily {
    Llama,
    Anthropic,
    Titan,
}

impl TextModelFamily {
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        let mut segments = model_id.split('.');
        let mut provider = segments.next()?;
        // cross-region inference profiles look like `us.meta.llama3-...`
        if matches!(provider, "us" | "eu" | "apac" | "us-gov" | "global") {
            provider = segments.next()?;
        }
        match provider {
            "meta" => Some(TextModelFamily::Llama),
            "anthropic" => Some(TextModelFamily::Anthropic),
            "amazon" => Some(TextModelFamily::Titan),
            _ => None,
        }
    }
}

/// Translates task requests into Bedrock wire calls and decodes the replies.
///
/// The adapter holds only immutable configuration and the injected invoker, so one
/// request never influences another.
pub struct ModelAdapter<I> {
    invoker: I,
    config: AdapterConfig,
}

impl<I: ModelInvoker> ModelAdapter<I> {
    pub fn new(invoker: I, config: AdapterConfig) -> Self {
        Self { invoker, config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn invoke(&self, request: InvocationRequest) -> Result<InvocationResult, AdapterError> {
        match request {
            InvocationRequest::TextAnalysis { prompt, model_id } => self
                .generate_text(&prompt, &model_id)
                .map(InvocationResult::Text),
            InvocationRequest::ImageGeneration { scene, style } => {
                let bytes = self.generate_image(&scene, &style)?;
                let format = media::detect_format(&bytes);
                Ok(InvocationResult::Image { bytes, format })
            }
            InvocationRequest::ImageDescription {
                image,
                media_type,
                instruction,
            } => self
                .describe_image(&image, &media_type, &instruction)
                .map(InvocationResult::Text),
        }
    }

    pub fn generate_text(
        &self,
        prompt: &RenderedPrompt,
        model_id: &str,
    ) -> Result<String, AdapterError> {
        let task = TaskKind::TextAnalysis;
        let family = TextModelFamily::from_model_id(model_id)
            .ok_or_else(|| InvocationError::UnsupportedModel(model_id.to_string()))
            .map_err(AdapterError::invocation(task))?;
        info!("Generating text with {} ({:?})", model_id, family);
        debug!("Prompt input is: {}", prompt);

        let body = match family {
            TextModelFamily::Llama => serde_json::to_vec(&LlamaBody {
                prompt: prompt.as_str(),
            }),
            TextModelFamily::Titan => serde_json::to_vec(&TitanTextBody {
                input_text: prompt.as_str(),
            }),
            TextModelFamily::Anthropic => serde_json::to_vec(&MessagesBody {
                anthropic_version: &self.config.vision.anthropic_version,
                max_tokens: self.config.vision.max_tokens,
                temperature: self.config.vision.temperature,
                system: None,
                messages: vec![Message {
                    role: "user",
                    content: vec![ContentPart::Text {
                        text: prompt.as_str(),
                    }],
                }],
            }),
        }
        .map_err(|e| AdapterError::invocation(task)(e.into()))?;

        let response = self
            .invoker
            .invoke_model(model_id, body)
            .map_err(AdapterError::invocation(task))?;
        let decoded = match family {
            TextModelFamily::Llama => payload::decode_llama_envelope(&response),
            TextModelFamily::Titan => payload::decode_titan_text_envelope(&response),
            TextModelFamily::Anthropic => payload::decode_messages_envelope(&response),
        };
        decoded.map_err(AdapterError::decode(task))
    }

    /// Generates one image for `"<style_tag> <scene_description>"` and returns its bytes.
    pub fn generate_image(
        &self,
        scene_description: &str,
        style_tag: &str,
    ) -> Result<Vec<u8>, AdapterError> {
        let task = TaskKind::ImageGeneration;
        let text = format!("{style_tag} {scene_description}");
        let params = &self.config.image_generation;
        let body = serde_json::to_vec(&ImageGenerationBody {
            text_prompts: vec![TextPrompt { text: &text }],
            cfg_scale: params.cfg_scale,
            steps: params.steps,
        })
        .map_err(|e| AdapterError::invocation(task)(e.into()))?;
        info!(
            "Generating image with {} (cfg_scale {}, steps {})",
            self.config.image_model_id, params.cfg_scale, params.steps
        );

        let response = self
            .invoker
            .invoke_model(&self.config.image_model_id, body)
            .map_err(AdapterError::invocation(task))?;
        let image = payload::decode_image_envelope(&response).map_err(AdapterError::decode(task))?;
        debug!("Decoded {} image bytes", image.len());
        Ok(image)
    }

    /// Describes an image with the vision model. An empty instruction is replaced
    /// with the default one.
    pub fn describe_image(
        &self,
        image_bytes: &[u8],
        media_type: &str,
        instruction_text: &str,
    ) -> Result<String, AdapterError> {
        let task = TaskKind::ImageDescription;
        let instruction = if instruction_text.trim().is_empty() {
            DEFAULT_INSTRUCTION
        } else {
            instruction_text
        };
        let vision = &self.config.vision;
        let body = serde_json::to_vec(&MessagesBody {
            anthropic_version: &vision.anthropic_version,
            max_tokens: vision.max_tokens,
            temperature: vision.temperature,
            system: Some(VISION_SYSTEM_PROMPT),
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Image {
                        source: ImageSource::base64(media_type, image_bytes),
                    },
                    ContentPart::Text { text: instruction },
                ],
            }],
        })
        .map_err(|e| AdapterError::invocation(task)(e.into()))?;
        info!(
            "Describing {} byte {} image with {}",
            image_bytes.len(),
            media_type,
            self.config.vision_model_id
        );

        let response = self
            .invoker
            .invoke_model(&self.config.vision_model_id, body)
            .map_err(AdapterError::invocation(task))?;
        payload::decode_messages_envelope(&response).map_err(AdapterError::decode(task))
    }

    /// Stages an uploaded image, describes it, and removes the staged file on every
    /// path out of this call.
    pub fn describe_upload(
        &self,
        staging_dir: &Path,
        upload_name: &str,
        upload: &[u8],
        instruction_text: &str,
    ) -> Result<String, AdapterError> {
        let task = TaskKind::ImageDescription;
        let staged = StagedImageFile::create(staging_dir, upload_name, upload)
            .map_err(AdapterError::staging(task))?;
        info!("Staged {} as {}", upload_name, staged.path().display());
        let image = staged.read().map_err(AdapterError::staging(task))?;
        let media_type = media::vision_media_type(&image)
            .map_err(|reason| AdapterError::InvalidInput { task, reason })?;
        self.describe_image(&image, media_type, instruction_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_from_model_id() {
        assert_eq!(
            TextModelFamily::from_model_id("meta.llama3-70b-instruct-v1:0"),
            Some(TextModelFamily::Llama)
        );
        assert_eq!(
            TextModelFamily::from_model_id("us.anthropic.claude-3-haiku-20240307-v1:0"),
            Some(TextModelFamily::Anthropic)
        );
        assert_eq!(
            TextModelFamily::from_model_id("amazon.titan-text-express-v1"),
            Some(TextModelFamily::Titan)
        );
        assert_eq!(TextModelFamily::from_model_id("cohere.command-r-v1:0"), None);
        assert_eq!(TextModelFamily::from_model_id("us"), None);
    }

    #[test]
    fn request_task_kinds() {
        let request = InvocationRequest::ImageGeneration {
            scene: "a cat".into(),
            style: "pixel-art".into(),
        };
        assert_eq!(request.task(), TaskKind::ImageGeneration);
    }

    #[test]
    fn default_config_uses_fixed_generation_parameters() {
        let config = AdapterConfig::default();
        assert_eq!(config.image_generation.cfg_scale, 9);
        assert_eq!(config.image_generation.steps, 50);
        assert_eq!(config.vision.max_tokens, 1000);
        assert_eq!(config.vision.anthropic_version, "bedrock-2023-05-31");
    }
}
