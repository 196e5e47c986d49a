//! `mosaic` command-line driver
//!
//! - `mosaic round --token <t>...` runs one round per token against a live
//!   search provider and prints the round reports
//! - `mosaic scan <file>` prints the eligible image URLs of a saved page

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mosaic_core::{MosaicConfig, MosaicSession, RoundReport};
use mosaic_fetch::{scan_document, SearchProvider};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("mosaic")
        .version(mosaic_core::VERSION)
        .about("Grow an image mosaic from search results")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("round")
                .about("Run one round per query token")
                .arg(
                    Arg::new("token")
                        .long("token")
                        .short('t')
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Query token; repeat for several rounds"),
                )
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .value_parser(value_parser!(SearchProvider))
                        .help("google, bing, or a URL template with one {}"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .value_parser(value_parser!(usize))
                        .help("Fetch worker pool size"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Allocation seed for reproducible placement"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print reports as JSON"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("List eligible image URLs in a saved results page")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("HTML file to scan"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &ArgMatches) -> Result<MosaicConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => MosaicConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MosaicConfig::default(),
    };

    if let Some(provider) = args.get_one::<SearchProvider>("provider") {
        config = config.with_provider(provider.clone());
    }
    if let Some(workers) = args.get_one::<usize>("workers") {
        config = config.with_workers(*workers);
    }
    if let Some(seed) = args.get_one::<u64>("seed") {
        config = config.with_seed(*seed);
    }

    config.validate()?;
    Ok(config)
}

async fn run_rounds(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let json = args.get_flag("json");
    let mut session = MosaicSession::new(config).context("starting session")?;
    let mut reports: Vec<RoundReport> = Vec::new();

    for token in args.get_many::<String>("token").into_iter().flatten() {
        match session.advance_round(token).await {
            Ok(report) => {
                if !json {
                    println!("{report}");
                }
                reports.push(report);
            }
            Err(e) if e.is_round_fatal() => {
                tracing::warn!("Round for '{}' abandoned: {}", token, e);
            }
            Err(e) => return Err(e).context(format!("round for '{token}'")),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let images = session.images();
        println!(
            "{} rounds on {}, {} of {} cells filled",
            session.rounds(),
            session.logical_dims(),
            images.written_count(),
            session.logical_dims().area()
        );
    }
    Ok(())
}

fn run_scan(args: &ArgMatches) -> Result<()> {
    let Some(path) = args.get_one::<PathBuf>("file") else {
        anyhow::bail!("missing file argument");
    };
    let document =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let summary = scan_document(&document);
    for url in &summary.urls {
        println!("{url}");
    }
    tracing::info!(
        "{} img tags, {} eligible, {} ineligible, {} without src",
        summary.tags,
        summary.urls.len(),
        summary.ineligible,
        summary.misses
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("round", args)) => run_rounds(args).await,
        Some(("scan", args)) => run_scan(args),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn round_collects_repeated_tokens() {
        let matches = cli()
            .try_get_matches_from(["mosaic", "round", "-t", "cars", "--token", "red boats", "--provider", "google"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let tokens: Vec<&String> = args.get_many::<String>("token").unwrap().collect();
        assert_eq!(tokens, ["cars", "red boats"]);
        assert_eq!(args.get_one::<SearchProvider>("provider"), Some(&SearchProvider::Google));
    }

    #[test]
    fn overrides_apply_to_config() {
        let matches = cli()
            .try_get_matches_from(["mosaic", "round", "-t", "x", "--workers", "3", "--seed", "5"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let config = load_config(args).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn rejects_template_without_slot() {
        let result = cli().try_get_matches_from(["mosaic", "round", "-t", "x", "--provider", "http://nope"]);
        assert!(result.is_err());
    }

    #[test]
    fn token_is_required() {
        assert!(cli().try_get_matches_from(["mosaic", "round"]).is_err());
    }
}
