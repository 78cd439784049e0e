use ai_studio::{AiStudio, AiStudioArgs, Settings};
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    use tracing_chrome::ChromeLayerBuilder;
    use tracing_subscriber::prelude::*;

    let start = std::time::Instant::now();

    // credentials may live in a .env file next to the binary's working directory
    let dotenv_path = dotenvy::dotenv().ok();

    let ai_studio_args = AiStudioArgs::parse();

    let settings = Settings::new()?;
    // -v/-q override the verbosity from settings
    let log_level_filter = ai_studio_args.verbose.log_level_filter().as_trace();

    let (chrome_layer, _guard) = if ai_studio_args.tracing {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
        (Some(chrome_layer), Some(guard))
    } else {
        (None, None)
    };
    tracing_subscriber::registry()
        .with(log_level_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(chrome_layer)
        .init();
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }
    info!("Initialized args, settings, and logging in {:?}", start.elapsed());

    let ai_studio = AiStudio::new(settings, ai_studio_args, Some(start));

    ai_studio.exec()?;

    Ok(())
}
