use std::cell::RefCell;
use std::collections::VecDeque;

use ai_studio::constants::{DEFAULT_INSTRUCTION, VISION_SYSTEM_PROMPT};
use ai_studio::{
    AdapterConfig, AdapterError, DecodeError, InvocationError, InvocationRequest,
    InvocationResult, ModelAdapter, ModelInvoker, PromptTemplate, TaskKind,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-pixels";

type Reply = Result<Vec<u8>, InvocationError>;

/// Records every request and answers from a queue of canned replies.
#[derive(Default)]
struct RecordingInvoker {
    requests: RefCell<Vec<(String, Value)>>,
    replies: RefCell<VecDeque<Reply>>,
}

impl RecordingInvoker {
    fn replying(reply: Reply) -> Self {
        let invoker = Self::default();
        invoker.replies.borrow_mut().push_back(reply);
        invoker
    }

    fn json(body: Value) -> Self {
        Self::replying(Ok(body.to_string().into_bytes()))
    }

    fn failing() -> Self {
        Self::replying(Err(InvocationError::Service {
            model_id: "any".into(),
            code: Some("ThrottlingException".into()),
            message: "Too many requests".into(),
        }))
    }

    fn last_request(&self) -> (String, Value) {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl ModelInvoker for RecordingInvoker {
    fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        let body: Value = serde_json::from_slice(&body).expect("request body is JSON");
        self.requests
            .borrow_mut()
            .push((model_id.to_string(), body));
        self.replies
            .borrow_mut()
            .pop_front()
            .expect("no reply queued")
    }
}

fn adapter(invoker: &RecordingInvoker) -> ModelAdapter<&RecordingInvoker> {
    ModelAdapter::new(invoker, AdapterConfig::default())
}

fn image_envelope(bytes: &[u8]) -> Value {
    json!({"result": "success", "artifacts": [{"seed": 42, "base64": STANDARD.encode(bytes), "finishReason": "SUCCESS"}]})
}

#[test]
fn image_prompt_is_style_then_scene() {
    let invoker = RecordingInvoker::json(image_envelope(PNG_BYTES));
    adapter(&invoker).generate_image("a cat", "pixel-art").unwrap();

    let (model_id, body) = invoker.last_request();
    assert_eq!(model_id, "stability.stable-diffusion-xl-v1");
    assert_eq!(body["text_prompts"][0]["text"], "pixel-art a cat");
    assert_eq!(body["cfg_scale"], 9);
    assert_eq!(body["steps"], 50);
}

#[test]
fn image_decode_returns_exact_bytes() {
    let payload: Vec<u8> = (0..=255u8).cycle().take(1337).collect();
    let invoker = RecordingInvoker::json(json!({"artifacts": [{"base64": STANDARD.encode(&payload)}]}));
    let image = adapter(&invoker).generate_image("a lake", "realistic").unwrap();
    assert_eq!(image.len(), 1337);
    assert_eq!(image, payload);
}

#[test]
fn missing_artifacts_is_a_decode_error() {
    let invoker = RecordingInvoker::json(json!({"result": "success"}));
    let err = adapter(&invoker)
        .generate_image("a cat", "pixel-art")
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Decode {
            task: TaskKind::ImageGeneration,
            source: DecodeError::MissingField("artifacts"),
        }
    ));
}

#[test]
fn invocation_failure_is_surfaced_without_retry() {
    let invoker = RecordingInvoker::failing();
    let err = adapter(&invoker)
        .generate_image("a cat", "pixel-art")
        .unwrap_err();
    assert!(err.is_invocation());
    assert_eq!(invoker.request_count(), 1);
    assert!(err.to_string().starts_with("image generation failed:"));
    assert!(err.to_string().contains("Too many requests"));
}

#[test]
fn empty_instruction_uses_the_default() {
    let invoker = RecordingInvoker::json(json!({"content": [{"type": "text", "text": "A red square."}]}));
    let description = adapter(&invoker)
        .describe_image(PNG_BYTES, "image/png", "")
        .unwrap();
    assert_eq!(description, "A red square.");

    let (model_id, body) = invoker.last_request();
    assert_eq!(model_id, "anthropic.claude-3-sonnet-20240229-v1:0");
    assert_eq!(body["system"], VISION_SYSTEM_PROMPT);
    assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["temperature"], 0.5);
    let content = &body["messages"][0]["content"];
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["source"]["type"], "base64");
    assert_eq!(content[0]["source"]["media_type"], "image/png");
    assert_eq!(content[0]["source"]["data"], STANDARD.encode(PNG_BYTES));
    assert_eq!(content[1]["type"], "text");
    assert_eq!(content[1]["text"], DEFAULT_INSTRUCTION);
}

#[test]
fn caller_instruction_is_sent_verbatim() {
    let invoker = RecordingInvoker::json(json!({"content": [{"type": "text", "text": "ok"}]}));
    adapter(&invoker)
        .describe_image(PNG_BYTES, "image/png", "Count the windows")
        .unwrap();
    let (_, body) = invoker.last_request();
    assert_eq!(body["messages"][0]["content"][1]["text"], "Count the windows");
}

#[test]
fn description_shape_mismatch_is_a_decode_error() {
    let invoker = RecordingInvoker::json(json!({"content": []}));
    let err = adapter(&invoker)
        .describe_image(PNG_BYTES, "image/png", "")
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Decode {
            task: TaskKind::ImageDescription,
            source: DecodeError::EmptyList("content"),
        }
    ));
}

#[test]
fn llama_text_generation() {
    let invoker = RecordingInvoker::json(json!({"generation": "It is about cats.", "stop_reason": "stop"}));
    let prompt = PromptTemplate::analysis().render("Cats are great.");
    let text = adapter(&invoker)
        .generate_text(&prompt, "meta.llama3-70b-instruct-v1:0")
        .unwrap();
    assert_eq!(text, "It is about cats.");

    let (model_id, body) = invoker.last_request();
    assert_eq!(model_id, "meta.llama3-70b-instruct-v1:0");
    assert_eq!(body, json!({"prompt": prompt.as_str()}));
}

#[test]
fn anthropic_text_generation() {
    let invoker = RecordingInvoker::json(json!({"content": [{"type": "text", "text": "Summary."}]}));
    let prompt = PromptTemplate::summary().render("Long text");
    let text = adapter(&invoker)
        .generate_text(&prompt, "anthropic.claude-3-haiku-20240307-v1:0")
        .unwrap();
    assert_eq!(text, "Summary.");

    let (_, body) = invoker.last_request();
    assert!(body.get("system").is_none());
    assert_eq!(body["messages"][0]["content"][0]["type"], "text");
    assert_eq!(body["messages"][0]["content"][0]["text"], prompt.as_str());
}

#[test]
fn titan_text_generation() {
    let invoker = RecordingInvoker::json(json!({"results": [{"outputText": "Hi", "completionReason": "FINISH"}]}));
    let prompt = PromptTemplate::summary().render("Hello");
    let text = adapter(&invoker)
        .generate_text(&prompt, "amazon.titan-text-express-v1")
        .unwrap();
    assert_eq!(text, "Hi");
    let (_, body) = invoker.last_request();
    assert_eq!(body, json!({"inputText": prompt.as_str()}));
}

#[test]
fn unknown_text_model_is_rejected_before_calling() {
    let invoker = RecordingInvoker::default();
    let prompt = PromptTemplate::summary().render("Hello");
    let err = adapter(&invoker)
        .generate_text(&prompt, "cohere.command-r-v1:0")
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Invocation {
            source: InvocationError::UnsupportedModel(_),
            ..
        }
    ));
    assert_eq!(invoker.request_count(), 0);
}

#[test]
fn text_failure_returns_no_partial_result() {
    let invoker = RecordingInvoker::failing();
    let prompt = PromptTemplate::analysis().render("T");
    let err = adapter(&invoker)
        .generate_text(&prompt, "meta.llama3-70b-instruct-v1:0")
        .unwrap_err();
    assert_eq!(err.task(), TaskKind::TextAnalysis);
    assert!(err.is_invocation());
}

#[test]
fn invoke_dispatches_by_task() {
    let invoker = RecordingInvoker::json(image_envelope(PNG_BYTES));
    let result = adapter(&invoker)
        .invoke(InvocationRequest::ImageGeneration {
            scene: "a cat".into(),
            style: "pixel-art".into(),
        })
        .unwrap();
    assert_eq!(
        result,
        InvocationResult::Image {
            bytes: PNG_BYTES.to_vec(),
            format: Some(image::ImageFormat::Png),
        }
    );

    let invoker = RecordingInvoker::json(json!({"generation": "done"}));
    let result = adapter(&invoker)
        .invoke(InvocationRequest::TextAnalysis {
            prompt: PromptTemplate::summary().render("x"),
            model_id: "meta.llama3-8b-instruct-v1:0".into(),
        })
        .unwrap();
    assert_eq!(result, InvocationResult::Text("done".into()));
}

#[test]
fn adapter_is_reusable_after_a_failure() {
    let invoker = RecordingInvoker::failing();
    invoker
        .replies
        .borrow_mut()
        .push_back(Ok(image_envelope(PNG_BYTES).to_string().into_bytes()));
    let adapter = adapter(&invoker);
    assert!(adapter.generate_image("a cat", "pixel-art").is_err());
    assert_eq!(
        adapter.generate_image("a cat", "pixel-art").unwrap(),
        PNG_BYTES
    );
}
