use std::fmt;

use thiserror::Error;

/// The user-facing task an adapter call belongs to, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    TextAnalysis,
    ImageGeneration,
    ImageDescription,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::TextAnalysis => "text analysis",
            TaskKind::ImageGeneration => "image generation",
            TaskKind::ImageDescription => "image description",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The remote call did not produce a response body.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("{model_id} rejected the request ({}): {message}", .code.as_deref().unwrap_or("unknown error"))]
    Service {
        model_id: String,
        code: Option<String>,
        message: String,
    },
    #[error("could not reach {model_id}: {message}")]
    Transport { model_id: String, message: String },
    #[error("could not encode the request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no request format is known for model {0}")]
    UnsupportedModel(String),
}

/// A response body arrived but did not have the expected shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    #[error("`{0}` is empty")]
    EmptyList(&'static str),
    #[error("`{field}` is not valid base64: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("the model did not produce an artifact (finish reason {0})")]
    ArtifactRejected(String),
}

/// Error returned by every adapter operation. Each variant names the task that failed.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{task} failed: {source}")]
    Invocation {
        task: TaskKind,
        #[source]
        source: InvocationError,
    },
    #[error("{task} failed: {source}")]
    Decode {
        task: TaskKind,
        #[source]
        source: DecodeError,
    },
    #[error("{task} failed: {reason}")]
    InvalidInput { task: TaskKind, reason: String },
    #[error("{task} failed: could not stage the uploaded image: {source}")]
    Staging {
        task: TaskKind,
        #[source]
        source: std::io::Error,
    },
}

impl AdapterError {
    pub fn task(&self) -> TaskKind {
        match self {
            AdapterError::Invocation { task, .. }
            | AdapterError::Decode { task, .. }
            | AdapterError::InvalidInput { task, .. }
            | AdapterError::Staging { task, .. } => *task,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, AdapterError::Decode { .. })
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self, AdapterError::Invocation { .. })
    }

    pub(crate) fn invocation(task: TaskKind) -> impl FnOnce(InvocationError) -> Self {
        move |source| AdapterError::Invocation { task, source }
    }

    pub(crate) fn decode(task: TaskKind) -> impl FnOnce(DecodeError) -> Self {
        move |source| AdapterError::Decode { task, source }
    }

    pub(crate) fn staging(task: TaskKind) -> impl FnOnce(std::io::Error) -> Self {
        move |source| AdapterError::Staging { task, source }
    }
}

/// A template string was not usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no `{{{0}}}` placeholder")]
    MissingPlaceholder(String),
    #[error("template uses `{{{0}}}` more than once")]
    RepeatedPlaceholder(String),
}
