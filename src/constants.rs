// constants file
pub const DEFAULT_TEXT_MODEL_ID: &str = "meta.llama3-70b-instruct-v1:0";
pub const DEFAULT_IMAGE_MODEL_ID: &str = "stability.stable-diffusion-xl-v1";
pub const DEFAULT_VISION_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const DEFAULT_STAGING_DIR: &str = "./images";
pub const DEFAULT_REGION: &str = "us-east-1";

pub const VISION_SYSTEM_PROMPT: &str =
    "Describe every detail you can about this image, be extremely thorough.";

// sent when the caller gives no instruction, the vision model rejects empty text blocks
pub const DEFAULT_INSTRUCTION: &str = "Use the system prompt";

pub const DEFAULT_CONFIG_CONTENT: &str = r#"# ai-studio settings
verbosity = "info"

[aws_settings]
region = "us-east-1"
# profile = "default"
# access_key_id and secret_access_key are read from AWS_ACCESS_KEY_ID and
# AWS_SECRET_ACCESS_KEY when set

[adapter]
text_model_id = "meta.llama3-70b-instruct-v1:0"
image_model_id = "stability.stable-diffusion-xl-v1"
vision_model_id = "anthropic.claude-3-sonnet-20240229-v1:0"

[adapter.image_generation]
cfg_scale = 9
steps = 50

[adapter.vision]
anthropic_version = "bedrock-2023-05-31"
max_tokens = 1000
temperature = 0.5

[staging]
dir = "./images"
"#;
