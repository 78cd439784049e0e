use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::LogLevel;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::adapter::ModelAdapter;
use crate::ai_backend::{BedrockInvoker, ModelInvoker};
use crate::media;
use crate::prompt::PromptTemplate;
use crate::settings::Settings;

#[derive(Debug)]
pub struct ConfigLogLevel {}

impl LogLevel for ConfigLogLevel {
    fn default() -> Option<clap_verbosity_flag::Level> {
        // read from settings options
        let log_level = Settings::new()
            .ok()
            .and_then(|settings| settings.verbosity)
            .unwrap_or_else(|| "info".to_string());
        let level = match log_level.as_str() {
            "error" => Some(clap_verbosity_flag::Level::Error),
            "warn" => Some(clap_verbosity_flag::Level::Warn),
            "info" => Some(clap_verbosity_flag::Level::Info),
            "debug" => Some(clap_verbosity_flag::Level::Debug),
            "trace" => Some(clap_verbosity_flag::Level::Trace),
            _ => Some(clap_verbosity_flag::Level::Info),
        };
        level
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum ArtStyle {
    Fantasy,
    Futuristic,
    #[default]
    Realistic,
    #[value(name = "sci-fi")]
    SciFi,
    Surreal,
    PixelArt,
}

impl ArtStyle {
    /// Tag prepended to the scene description.
    pub fn tag(&self) -> &'static str {
        match self {
            ArtStyle::Fantasy => "fantasy",
            ArtStyle::Futuristic => "futuristic",
            ArtStyle::Realistic => "realistic",
            ArtStyle::SciFi => "science fiction",
            ArtStyle::Surreal => "surrealist",
            ArtStyle::PixelArt => "pixel-art",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Task {
    /// Multi-section analysis of a text (reads stdin when --text is omitted).
    Analyze {
        #[arg(long)]
        text: Option<String>,
        /// Text model id, defaults to the configured one.
        #[arg(long)]
        model: Option<String>,
    },
    /// Key-point summary of a text (reads stdin when --text is omitted).
    Summarize {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Generate an image from a scene description.
    Imagine {
        #[arg(long)]
        scene: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        style: ArtStyle,
        #[arg(long, default_value = "artwork.png")]
        output: PathBuf,
    },
    /// Describe an image file in detail.
    Describe {
        image: PathBuf,
        /// Reference text to steer the description.
        #[arg(long)]
        instruction: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AiStudioArgs {
    /// Enable tracing (generates a trace-timestamp.json file).
    #[arg(long)]
    pub tracing: bool,

    /// Copy a text result to the clipboard.
    #[cfg(feature = "clipboard")]
    #[arg(long)]
    pub copy: bool,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<ConfigLogLevel>,

    #[command(subcommand)]
    pub task: Task,
}

pub struct AiStudio {
    settings: Settings,
    args: AiStudioArgs,
    start: Instant,
}

impl AiStudio {
    pub fn new(settings: Settings, args: AiStudioArgs, start: Option<Instant>) -> Self {
        Self {
            settings,
            args,
            start: start.unwrap_or(Instant::now()),
        }
    }

    pub fn exec(self) -> Result<()> {
        info!("Settings: {:?}", self.settings);
        let invoker = BedrockInvoker::new(&self.settings.aws_settings)?;
        info!("Client ready in {:?}", self.start.elapsed());
        let adapter = ModelAdapter::new(invoker, self.settings.adapter.clone());
        let output = self.run(&adapter)?;
        info!("Finished in {:?}", self.start.elapsed());
        if let Some(text) = output {
            println!("{text}");
            self.copy_to_clipboard(&text)?;
        }
        Ok(())
    }

    #[cfg(feature = "clipboard")]
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        if self.args.copy {
            arboard::Clipboard::new()?.set_text(text)?;
            info!("Copied result to clipboard");
        }
        Ok(())
    }

    #[cfg(not(feature = "clipboard"))]
    fn copy_to_clipboard(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Runs the selected task and returns the text to print, if any.
    fn run<I: ModelInvoker>(&self, adapter: &ModelAdapter<I>) -> Result<Option<String>> {
        match &self.args.task {
            Task::Analyze { text, model } => {
                self.text_task(adapter, PromptTemplate::analysis(), text.as_deref(), model.as_deref())
            }
            Task::Summarize { text, model } => {
                self.text_task(adapter, PromptTemplate::summary(), text.as_deref(), model.as_deref())
            }
            Task::Imagine {
                scene,
                style,
                output,
            } => {
                let scene = read_input(scene.as_deref(), "a scene description")?;
                let image = with_spinner("Creating artwork...", || {
                    adapter.generate_image(&scene, style.tag())
                })?;
                if let Some(format) = media::detect_format(&image) {
                    info!("Generated a {:?} image", format);
                }
                std::fs::write(output, &image)
                    .with_context(|| format!("could not write {}", output.display()))?;
                println!("Saved {} bytes to {}", image.len(), output.display());
                Ok(None)
            }
            Task::Describe { image, instruction } => {
                let upload = std::fs::read(image)
                    .with_context(|| format!("could not read {}", image.display()))?;
                let upload_name = image
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("upload");
                let instruction = match instruction.as_deref().map(str::trim) {
                    Some(reference) if !reference.is_empty() => PromptTemplate::description_request()
                        .render(reference)
                        .into_string(),
                    _ => String::new(),
                };
                let description = with_spinner("Analyzing image...", || {
                    adapter.describe_upload(
                        &self.settings.staging.dir,
                        upload_name,
                        &upload,
                        &instruction,
                    )
                })?;
                Ok(Some(description))
            }
        }
    }

    fn text_task<I: ModelInvoker>(
        &self,
        adapter: &ModelAdapter<I>,
        template: PromptTemplate,
        text: Option<&str>,
        model: Option<&str>,
    ) -> Result<Option<String>> {
        let text = read_input(text, "a text")?;
        let model_id = model
            .unwrap_or(adapter.config().text_model_id.as_str())
            .to_string();
        let prompt = template.render(&text);
        let response = with_spinner(&format!("Processing with {model_id}..."), || {
            adapter.generate_text(&prompt, &model_id)
        })?;
        Ok(Some(response))
    }
}

/// Uses the flag value, or stdin when the flag is missing and stdin is piped.
fn read_input(value: Option<&str>, what: &str) -> Result<String> {
    let input = match value {
        Some(value) => value.to_string(),
        None if !std::io::stdin().is_terminal() => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => String::new(),
    };
    if input.trim().is_empty() {
        warn!("No input given");
        anyhow::bail!("Please provide {what} to send to the model");
    }
    Ok(input)
}

/// Shows a spinner on stderr while `call` blocks.
fn with_spinner<T, E>(message: &str, call: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = call();
    spinner.finish_and_clear();
    result
}
