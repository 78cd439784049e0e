//! Wire formats for the Bedrock models the adapter talks to.
//!
//! Request bodies borrow from the caller and serialize with `serde_json`. Response
//! envelopes deserialize into structs whose fields are all optional, so that every
//! nested lookup is checked here and reported as a named [`DecodeError`] instead of
//! surfacing as a generic deserialization failure.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

#[derive(Debug, Serialize)]
pub struct TextPrompt<'a> {
    pub text: &'a str,
}

/// Stable Diffusion XL text-to-image body.
#[derive(Debug, Serialize)]
pub struct ImageGenerationBody<'a> {
    pub text_prompts: Vec<TextPrompt<'a>>,
    pub cfg_scale: u32,
    pub steps: u32,
}

/// Anthropic messages body, used both for vision and for plain text requests.
#[derive(Debug, Serialize)]
pub struct MessagesBody<'a> {
    pub anthropic_version: &'a str,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
pub struct ImageSource<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media_type: &'a str,
    pub data: String,
}

impl<'a> ImageSource<'a> {
    pub fn base64(media_type: &'a str, image: &[u8]) -> Self {
        Self {
            kind: "base64",
            media_type,
            data: STANDARD.encode(image),
        }
    }
}

/// Meta Llama completion body.
#[derive(Debug, Serialize)]
pub struct LlamaBody<'a> {
    pub prompt: &'a str,
}

/// Amazon Titan text body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextBody<'a> {
    pub input_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageEnvelope {
    artifacts: Option<Vec<Artifact>>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    base64: Option<String>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesEnvelope {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlamaEnvelope {
    generation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitanTextEnvelope {
    results: Option<Vec<TitanResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    output_text: Option<String>,
}

/// Decodes `artifacts[0].base64` into raw image bytes.
pub fn decode_image_envelope(body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let envelope: ImageEnvelope = serde_json::from_slice(body)?;
    let artifacts = envelope
        .artifacts
        .ok_or(DecodeError::MissingField("artifacts"))?;
    let artifact = artifacts
        .into_iter()
        .next()
        .ok_or(DecodeError::EmptyList("artifacts"))?;
    if let Some(reason) = artifact.finish_reason {
        if reason == "ERROR" || reason == "CONTENT_FILTERED" {
            return Err(DecodeError::ArtifactRejected(reason));
        }
    }
    let encoded = artifact
        .base64
        .ok_or(DecodeError::MissingField("artifacts[0].base64"))?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|source| DecodeError::InvalidBase64 {
            field: "artifacts[0].base64",
            source,
        })
}

/// Extracts `content[0].text` from an Anthropic messages response.
pub fn decode_messages_envelope(body: &[u8]) -> Result<String, DecodeError> {
    let envelope: MessagesEnvelope = serde_json::from_slice(body)?;
    let block = envelope
        .content
        .ok_or(DecodeError::MissingField("content"))?
        .into_iter()
        .next()
        .ok_or(DecodeError::EmptyList("content"))?;
    block.text.ok_or(DecodeError::MissingField("content[0].text"))
}

pub fn decode_llama_envelope(body: &[u8]) -> Result<String, DecodeError> {
    let envelope: LlamaEnvelope = serde_json::from_slice(body)?;
    envelope
        .generation
        .ok_or(DecodeError::MissingField("generation"))
}

pub fn decode_titan_text_envelope(body: &[u8]) -> Result<String, DecodeError> {
    let envelope: TitanTextEnvelope = serde_json::from_slice(body)?;
    let result = envelope
        .results
        .ok_or(DecodeError::MissingField("results"))?
        .into_iter()
        .next()
        .ok_or(DecodeError::EmptyList("results"))?;
    result
        .output_text
        .ok_or(DecodeError::MissingField("results[0].outputText"))
}
