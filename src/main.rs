use anyhow::{Context, Result};
use skycast_core::Config;

const USAGE: &str = "Usage: skycast [serve | dashboard [server-url]]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    skycast_core::init()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("serve") => {
            let (config, _) = Config::load_validated().context("Invalid configuration")?;
            tracing::info!("Skycast server starting");
            tracing::info!("  Config directory: {}", config.config_dir.display());
            tracing::info!("  Store: {}", config.store_url());

            if let Err(e) = skycast_server::serve(&config).await {
                tracing::error!("Server failed: {}", e);
                eprintln!("{}", e.user_message());
                return Err(e.into());
            }
            Ok(())
        }
        Some("dashboard") => {
            let config = Config::load().context("Failed to load configuration")?;
            let base_url = args
                .next()
                .unwrap_or_else(|| format!("http://localhost:{}", config.server.port));

            skycast_ui::run(&base_url, config.weather.units).await
        }
        Some("-h") | Some("--help") | Some("help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown command `{}`. {}", other, USAGE),
    }
}
