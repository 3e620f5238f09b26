use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use ledger_client::config::{load_config, ClientConfig};
use ledger_client::observability::{logging, metrics};
use ledger_client::{HsmSigner, TransactionTemplate};

#[derive(Parser)]
#[command(name = "ledger-cli")]
#[command(about = "Sign ledger transaction templates with a chain of HSM signers", long_about = None)]
struct Cli {
    /// Client configuration file (TOML).
    #[arg(short, long, default_value = "ledger-client.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign one transaction template (JSON file, `-` for stdin)
    Sign { template: PathBuf },
    /// Sign a JSON array of templates; `null` entries are skipped
    SignBatch { templates: PathBuf },
    /// Validate the configuration and list the signer chain
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability);
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let signer = HsmSigner::from_config(&config)?;
    tracing::info!(signers = signer.len(), "Signer chain ready");

    match cli.command {
        Commands::Sign { template } => {
            let template: TransactionTemplate = serde_json::from_value(read_json(&template)?)?;
            let signed = signer.sign(template).await?;
            print_json(&signed)?;
        }
        Commands::SignBatch { templates } => {
            let templates: Vec<Option<TransactionTemplate>> =
                serde_json::from_value(read_json(&templates)?)?;
            let result = signer.sign_batch(templates).await?;
            if !result.errors.is_empty() {
                tracing::warn!(errors = result.errors.len(), "Some templates were not signed");
            }
            print_json(&result)?;
        }
        Commands::CheckConfig => print_chain(&config, &signer),
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let value: Value = if path == Path::new("-") {
        serde_json::from_reader(std::io::stdin().lock())?
    } else {
        serde_json::from_str(&std::fs::read_to_string(path)?)?
    };
    Ok(value)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_chain(config: &ClientConfig, signer: &HsmSigner) {
    println!("core: {}", config.core.url);
    if signer.is_empty() {
        println!("no signers configured; templates are returned unchanged");
        return;
    }
    for (i, registration) in signer.registrations().iter().enumerate() {
        println!("{}. {} ({} keys)", i + 1, registration.id, registration.xpubs.len());
    }
}
