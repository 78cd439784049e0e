use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::config::Credentials;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;

use anyhow::Result;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::common::ModelInvoker;
use crate::error::InvocationError;
use crate::settings::AwsSettings;

const CREDENTIALS_SOURCE: &str = "ai-studio-settings";

/// Invokes models on the Bedrock runtime. Owns its Tokio runtime and blocks the
/// caller for the duration of each call.
pub struct BedrockInvoker {
    runtime: Runtime,
    client: Client,
}

impl BedrockInvoker {
    pub fn new(aws_settings: &AwsSettings) -> Result<Self> {
        let runtime = Runtime::new()?;
        let region = aws_settings.region.clone();
        info!("Using region: {}", region);

        let sdk_config = runtime.block_on(async {
            let mut loader =
                aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
            match aws_settings.static_credentials() {
                Some((access_key_id, secret_access_key)) => {
                    info!("Using credentials from settings");
                    loader = loader.credentials_provider(Credentials::new(
                        access_key_id,
                        secret_access_key,
                        None,
                        None,
                        CREDENTIALS_SOURCE,
                    ));
                }
                None => {
                    if let Some(profile) = &aws_settings.profile {
                        info!("Using profile: {}", profile);
                        loader = loader.profile_name(profile);
                    }
                }
            }
            loader.load().await
        });
        info!("Creating bedrock client");
        let client = Client::new(&sdk_config);
        Ok(Self { runtime, client })
    }
}

impl ModelInvoker for BedrockInvoker {
    fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        debug!("Sending {} byte request to {}", body.len(), model_id);
        let response = self
            .runtime
            .block_on(
                self.client
                    .invoke_model()
                    .model_id(model_id)
                    .content_type("application/json")
                    .accept("application/json")
                    .body(Blob::new(body))
                    .send(),
            )
            .map_err(|e| match e.as_service_error() {
                Some(error) => InvocationError::Service {
                    model_id: model_id.to_string(),
                    code: error.meta().code().map(str::to_string),
                    message: error
                        .meta()
                        .message()
                        .unwrap_or("Unable to see service error message")
                        .to_string(),
                },
                None => InvocationError::Transport {
                    model_id: model_id.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                },
            })?;
        info!("Response received from {}", model_id);
        let body = response.body.into_inner();
        debug!("Response body is {} bytes", body.len());
        Ok(body)
    }
}
