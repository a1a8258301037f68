use clap::Parser;
use log::{error, info, warn};
use medscan::configuration::config::Config;
use medscan::guidance;
use medscan::session_management::{ScanOutcome, ScanSubscription};
use medscan::{HttpIdentificationClient, ImageDirectoryBackend, SessionLifecycleManager};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "medscan")]
#[command(version = "0.1.0")]
#[command(about = "Identifies a medication from its packaging")]
struct Cli {
    /// TOML configuration file
    config_file: PathBuf,

    /// Identification service endpoint, overrides `service.endpoint`
    #[arg(long, env = "MEDSCAN_ENDPOINT")]
    endpoint: Option<String>,

    /// Locale for the analysis and the guidance messages, overrides `scan.locale`
    #[arg(long)]
    locale: Option<String>,

    /// Directory of still images replayed as the camera stream
    #[arg(long, value_name = "DIR")]
    images: PathBuf,
}

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Cli::parse();

    info!("Importing configuration");
    let config = match Config::from_file(&args.config_file)
        .and_then(|config| config.with_overrides(args.endpoint.clone(), args.locale.clone()))
    {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration from file: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration imported successfully");

    let client = match HttpIdentificationClient::new(&config.service_settings()) {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to create the identification client: {}, exiting...", e);
            std::process::exit(1);
        }
    };
    info!("Identification service at {}", client.endpoint());

    let settings = config.scan_settings();
    let locale = settings.locale.clone();
    let backend = ImageDirectoryBackend::new(&args.images);
    let mut manager = SessionLifecycleManager::new(Arc::new(backend), Arc::new(client), settings);

    let ScanSubscription {
        mut progress,
        outcome,
    } = manager.activate();
    let outcome = outcome.wait();
    tokio::pin!(outcome);

    let mut stopping = false;
    let report = loop {
        tokio::select! {
            Some(update) = progress.recv() => {
                info!(
                    "[{:>3}%] {}",
                    update.confidence_percent,
                    guidance::resolve(update.message_key, &locale)
                );
            }
            report = &mut outcome => break report,
            _ = tokio::signal::ctrl_c(), if !stopping => {
                warn!("Interrupted, stopping the scan");
                manager.stop();
                stopping = true;
            }
        }
    };
    manager.shutdown().await;

    let code = match report {
        Ok(report) => match report.outcome {
            ScanOutcome::Identified(identification) => {
                info!(
                    "Identified after {} attempt(s)",
                    report.attempts.len()
                );
                match serde_json::to_string_pretty(&identification) {
                    Ok(json) => {
                        println!("{}", json);
                        0
                    }
                    Err(e) => {
                        error!("Unable to serialize the identification: {}", e);
                        1
                    }
                }
            }
            ScanOutcome::Failed(failure) => {
                error!("Scan failed: {}", failure.category);
                eprintln!("{}", guidance::resolve(failure.guidance_key, &locale));
                2
            }
            ScanOutcome::Cancelled => 130,
        },
        Err(e) => {
            error!("{}", e);
            1
        }
    };
    std::process::exit(code);
}
