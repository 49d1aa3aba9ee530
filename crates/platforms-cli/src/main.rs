use std::{path::PathBuf, time::Duration};

use afreecatv_parser::extractor::{
    default_factory,
    error::ExtractorError,
    platform_configs::{AfreecaTvConfig, merge_platform_extras},
};
use anyhow::Context;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The URL of the AfreecaTV page to parse
    url: String,

    /// The cookies to use for the request
    #[arg(long, env = "AFREECATV_COOKIES")]
    cookies: Option<String>,

    /// Output the result in JSON format
    #[arg(long)]
    json: bool,

    /// TOML file overriding the API hosts
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra extractor options as a JSON object, applied over the config file
    #[arg(long)]
    extras: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_extras(args: &Args) -> anyhow::Result<Option<serde_json::Value>> {
    let from_file = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: AfreecaTvConfig = toml::from_str(&content)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            Some(serde_json::to_value(config)?)
        }
        None => None,
    };
    let from_args: Option<serde_json::Value> = args
        .extras
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--extras is not valid JSON")?;
    let extras = merge_platform_extras(from_file, from_args);
    debug!(?extras, "Resolved extractor extras");
    Ok(extras)
}

fn spinner(message: &'static str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")?.tick_strings(&[
            "▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸", "▪▪▪▪▪",
        ]),
    );
    pb.set_message(message);
    Ok(pb)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let extras = load_extras(&args)?;
    let factory = default_factory();
    let extractor = factory
        .create_extractor(&args.url, args.cookies.clone(), extras)
        .with_context(|| format!("Failed to create extractor for URL: {}", &args.url))?;

    let pb = (!args.json)
        .then(|| spinner("Extracting media information..."))
        .transpose()?;
    let result = extractor.extract().await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let media_info = result.with_context(|| {
        format!(
            "Failed to fetch media information ({})",
            extractor.platform_name()
        )
    })?;

    if !media_info.is_container() && media_info.streams().is_empty() {
        anyhow::bail!(ExtractorError::NoStreamsFound);
    }

    if args.json {
        println!("{}", media_info.to_json_pretty()?);
    } else {
        println!("{}", "Media Information:".green().bold());
        println!("{}", media_info.pretty_print());
    }

    Ok(())
}
