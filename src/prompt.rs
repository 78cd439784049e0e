use std::fmt;

use crate::error::TemplateError;

pub const TEXT_VARIABLE: &str = "text";

const ANALYSIS_TEMPLATE: &str = "
    Analyze the following text: {text}

    1. Summary:
    Briefly summarize the content of the text.

    2. Main Topic:
    What is the central topic of the text?

    3. Structure:
    How is the text organized? (introduction, development, conclusion)

    4. Style and Tone:
    Describe the author's style and the tone of the text. Is it formal, informal, persuasive, narrative?

    5. Rhetorical Devices:
    Identify and analyze any rhetorical figure or literary device used.

    6. Target Audience:
    Who is the text addressed to? Which audience does it appeal to?

    7. Personal Opinion:
    What is your opinion of the text? Did you find it effective? Why?
    ";

const SUMMARY_TEMPLATE: &str = "
    Summarize only this text: {text}, as follows:
    Briefly summarize the content of the text, giving the key points and leaving out unnecessary details.
    ";

const DESCRIPTION_REQUEST_TEMPLATE: &str = "Analyze this image in extreme detail. Please return a textual answer with the most relevant details of the image. If present, use this text as a reference: {text}";

/// A prompt with exactly one `{variable}` slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    placeholder: String,
}

/// A template after substitution, ready to send to a text model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPrompt(String);

impl PromptTemplate {
    pub fn new(
        template: impl Into<String>,
        variable: impl AsRef<str>,
    ) -> Result<Self, TemplateError> {
        let template = template.into();
        let variable = variable.as_ref();
        let placeholder = format!("{{{variable}}}");
        match template.matches(placeholder.as_str()).count() {
            0 => Err(TemplateError::MissingPlaceholder(variable.to_string())),
            1 => Ok(Self {
                template,
                placeholder,
            }),
            _ => Err(TemplateError::RepeatedPlaceholder(variable.to_string())),
        }
    }

    fn builtin(template: &str) -> Self {
        Self {
            template: template.to_string(),
            placeholder: format!("{{{TEXT_VARIABLE}}}"),
        }
    }

    /// Seven-section analysis of a piece of text.
    pub fn analysis() -> Self {
        Self::builtin(ANALYSIS_TEMPLATE)
    }

    pub fn summary() -> Self {
        Self::builtin(SUMMARY_TEMPLATE)
    }

    /// Instruction sent alongside an image when the user supplied reference text.
    pub fn description_request() -> Self {
        Self::builtin(DESCRIPTION_REQUEST_TEMPLATE)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitutes `value` into the slot. The value is inserted verbatim and never
    /// scanned for placeholders itself.
    pub fn render(&self, value: &str) -> RenderedPrompt {
        // the placeholder occurs exactly once, so splitn(2) yields the text on both sides
        let mut parts = self.template.splitn(2, self.placeholder.as_str());
        let head = parts.next().unwrap_or_default();
        let tail = parts.next().unwrap_or_default();
        let mut rendered = String::with_capacity(head.len() + value.len() + tail.len());
        rendered.push_str(head);
        rendered.push_str(value);
        rendered.push_str(tail);
        RenderedPrompt(rendered)
    }
}

impl RenderedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RenderedPrompt {
    fn from(prompt: String) -> Self {
        Self(prompt)
    }
}

impl fmt::Display for RenderedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
