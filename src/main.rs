use clap::Parser;
use obit_feed::core::calendar::CalendarOptions;
use obit_feed::core::ConfigProvider;
use obit_feed::server::{self, AppState, RemoteFeed};
use obit_feed::utils::error::ErrorSeverity;
use obit_feed::utils::{logger, validation::Validate};
use obit_feed::{CliConfig, EtlEngine, IngestionPipeline, LocalStorage, TomlConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting obit-feed");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => run(config, cli.export).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli.clone(), cli.export).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ obit-feed failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run<C>(config: C, export: bool) -> obit_feed::Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    config.validate()?;

    let bind = config.bind_address().to_string();
    let calendar = CalendarOptions::new(config.time_zone(), config.product_id());
    let remote_feed = RemoteFeed::from_config(&config)?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = IngestionPipeline::new(storage, config)?;
    let engine = EtlEngine::new(pipeline);

    if export {
        let output_path = engine.run().await?;
        println!("✅ Feeds written to: {}", output_path);
        return Ok(());
    }

    let state = AppState::new(engine, calendar, remote_feed);
    server::start(&bind, Arc::new(state)).await
}
