//! fabspec - Fabric specification normalizer
//!
//! Command-line front end for the normalization pipeline:
//! - `normalize <text>` extract, classify and validate, print JSON
//! - `yarn <text>` warp/weft disambiguation only
//! - `classify <code>` weave code → category
//! - `migrate <json-file> --to <scheme>` rewrite fiber codes to another scheme

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fabspec::classifier::Classifier;
use fabspec::disambiguator::disambiguate;
use fabspec::types::SpecRecord;
use fabspec::vocabulary::{migrate_record, FiberScheme, Vocabulary};
use fabspec::Pipeline;
use fabspec_common::config::ConfigResolver;
use fabspec_common::logging::init_tracing;
use std::sync::Arc;
use tracing::{info, warn};

/// Command-line arguments for fabspec
#[derive(Parser, Debug)]
#[command(name = "fabspec")]
#[command(about = "Normalize textile specification strings into structured records")]
#[command(version)]
struct Args {
    /// Bootstrap config file (overrides FABSPEC_CONFIG)
    #[arg(short, long, env = "FABSPEC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, classify and validate one specification string
    Normalize {
        /// Raw specification text
        text: String,
    },
    /// Split a yarn count string into warp and weft
    Yarn {
        text: String,
    },
    /// Look up the category of a weave code
    Classify {
        code: String,
    },
    /// Rewrite a stored record's fiber codes into another scheme
    Migrate {
        /// Record JSON file
        file: PathBuf,
        /// Target scheme (legacy or iso)
        #[arg(long)]
        to: FiberScheme,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "Starting fabspec"
    );

    match args.command {
        Command::Normalize { text } => {
            let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
            let normalized = pipeline
                .normalize(&text)
                .await
                .context("Normalization failed")?;
            for deviation in &normalized.deviations {
                warn!(deviation = %deviation, "Record deviation");
            }
            println!("{}", serde_json::to_string_pretty(&normalized)?);
        }
        Command::Yarn { text } => {
            let yarn = match disambiguate(&text) {
                Ok(yarn) => yarn,
                Err(e) => {
                    warn!(error = %e, "Yarn segmentation failed, keeping raw text");
                    e.fallback
                }
            };
            println!("{}", serde_json::to_string_pretty(&yarn)?);
        }
        Command::Classify { code } => {
            let scheme: FiberScheme = config
                .vocabulary
                .fiber_scheme
                .parse()
                .map_err(anyhow::Error::msg)?;
            let classifier = Classifier::new(Arc::new(Vocabulary::standard(scheme)));
            let code = code.trim().to_ascii_uppercase();
            let repaired = classifier.classify_repair(&code);
            println!(
                "{}",
                serde_json::json!({
                    "fabric_code": repaired,
                    "categoryMajor": classifier.classify(repaired),
                    "repaired": repaired != code,
                })
            );
        }
        Command::Migrate { file, to } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut record: SpecRecord = serde_json::from_str(&json)
                .with_context(|| format!("{} is not a fabric record", file.display()))?;
            if record.meta.fiber_scheme == to {
                bail!("Record is already in the {} scheme", to);
            }
            let rewritten = migrate_record(&mut record, to)?;
            info!(file = %file.display(), to = %to, rewritten, "Record migrated");
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
