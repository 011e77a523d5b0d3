//! gp-harvest main entry point
//!
//! This is the command-line interface for the Space-Track bulk downloader.

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use gp_harvest::config::{load_config_with_hash, Config, PayloadFormat};
use gp_harvest::logging::{open_log_file, setup_logging};
use gp_harvest::range::{parse_date, partition, CatalogRange, RangeElement};
use gp_harvest::retrieval::{self, RetrievalSummary};
use gp_harvest::source::{DateField, IdClass, SatcatSelection};
use gp_harvest::{FileSink, HarvestError, SpaceTrackClient};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// gp-harvest: a polite bulk downloader for Space-Track
///
/// Downloads GP history, legacy TLE and SATCAT data one chunk at a time,
/// pacing requests to stay inside the provider's rate limit and stopping
/// once too many chunks have failed.
#[derive(Parser, Debug)]
#[command(name = "gp-harvest")]
#[command(version)]
#[command(about = "A polite bulk downloader for Space-Track orbital data", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "gp-harvest.toml", global = true)]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Replace files that already exist
    #[arg(long, global = true)]
    force: bool,

    /// Write plain files instead of gzip
    #[arg(long, global = true)]
    no_compress: bool,

    /// Payload format to request and write
    #[arg(long, value_enum, global = true)]
    format: Option<PayloadFormat>,

    /// Show the request plan without contacting the provider
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download element sets by catalog number range
    GpId {
        /// First catalog number
        start: u32,

        /// Last catalog number (defaults to START)
        end: Option<u32>,

        /// Catalog numbers per request
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        chunk: u64,

        /// Request class to query
        #[arg(long, value_enum, default_value_t = IdClass::GpHistory)]
        class: IdClass,
    },

    /// Download GP history by date range
    GpDate {
        /// First day (YYYY-MM-DD)
        start: String,

        /// Last day (defaults to START)
        end: Option<String>,

        /// Days per request
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        chunk: u64,

        /// Select by publication date instead of epoch
        #[arg(long)]
        creation_date: bool,
    },

    /// Download the satellite catalog
    Satcat {
        /// Catalog numbers to include (all when omitted)
        ids: Vec<u32>,

        /// Output path; its extension is replaced by the format's own
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::GpId { .. } => "gp-id",
            Self::GpDate { .. } => "gp-date",
            Self::Satcat { .. } => "satcat",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A dry run never logs in, so it needs no credentials
    let loaded = load_config_with_hash(&cli.config, !cli.dry_run);

    // The log directory comes from the config, so logging starts after it
    // is read; a broken config still gets logged to the default location.
    let log_dir = match &loaded {
        Ok((config, _)) => PathBuf::from(&config.output.log_dir),
        Err(_) => PathBuf::from(Config::default().output.log_dir),
    };
    let log_file = if cli.dry_run {
        None
    } else {
        match open_log_file(&log_dir, cli.command.name()) {
            Ok((_, file)) => Some(file),
            Err(e) => {
                eprintln!("Warning: cannot create log file in {}: {}", log_dir.display(), e);
                None
            }
        }
    };
    setup_logging(cli.verbose, cli.quiet, log_file);

    tracing::debug!("Loading configuration from: {}", cli.config.display());
    let mut config = match loaded {
        Ok((config, hash)) => {
            match hash {
                Some(hash) => tracing::debug!("Configuration loaded (hash: {})", hash),
                None => tracing::debug!("Configuration loaded from defaults and environment"),
            }
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::from(2);
        }
    };
    apply_cli_overrides(&mut config, &cli);

    match run(&config, cli.command, cli.dry_run).await {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(summary)) if summary.is_success() => ExitCode::SUCCESS,
        Ok(Some(_)) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Dispatches a subcommand
///
/// # Returns
///
/// * `Ok(None)` - Dry run, nothing was requested
/// * `Ok(Some(summary))` - The run finished or hit the error budget
/// * `Err(_)` - A setup error before the first request
async fn run(
    config: &Config,
    command: Command,
    dry_run: bool,
) -> anyhow::Result<Option<RetrievalSummary>> {
    let name = command.name();

    let result = match command {
        Command::GpId {
            start,
            end,
            chunk,
            class,
        } => handle_gp_id(config, start, end, chunk, class, dry_run).await,
        Command::GpDate {
            start,
            end,
            chunk,
            creation_date,
        } => {
            let field = if creation_date {
                DateField::CreationDate
            } else {
                DateField::Epoch
            };
            handle_gp_date(config, &start, end.as_deref(), chunk, field, dry_run).await
        }
        Command::Satcat { ids, output } => {
            handle_satcat(config, ids, output.as_deref(), dry_run).await
        }
    };

    result.with_context(|| format!("{} failed", name))
}

/// Applies the output flags on top of the `[output]` section
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if cli.force {
        config.output.overwrite = true;
    }
    if cli.no_compress {
        config.output.compress = false;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
}

/// Handles `gp-id`: catalog-number chunks
async fn handle_gp_id(
    config: &Config,
    start: u32,
    end: Option<u32>,
    chunk: u64,
    class: IdClass,
    dry_run: bool,
) -> gp_harvest::Result<Option<RetrievalSummary>> {
    let range = CatalogRange::new(start, end.unwrap_or(start));
    let mut sink = FileSink::from_config(&config.output);

    if dry_run {
        print_plan(&range, chunk, &sink)?;
        return Ok(None);
    }

    tracing::info!("Class: {}", class.as_str());
    let client =
        SpaceTrackClient::new(&config.space_track, config.output.format)?.with_id_class(class);
    let mut harvester = retrieval::harvester(client, &config.retrieval);
    let summary = harvester.run(&range, chunk, &mut sink).await?;
    Ok(Some(summary))
}

/// Handles `gp-date`: day chunks of GP history
async fn handle_gp_date(
    config: &Config,
    start: &str,
    end: Option<&str>,
    chunk: u64,
    field: DateField,
    dry_run: bool,
) -> gp_harvest::Result<Option<RetrievalSummary>> {
    let first = parse_date(start)?;
    let last = match end {
        Some(end) => parse_date(end)?,
        None => first,
    };
    let range = CatalogRange::new(first, last);
    let mut sink = FileSink::from_config(&config.output);

    if dry_run {
        print_plan(&range, chunk, &sink)?;
        return Ok(None);
    }

    tracing::info!("Field: {}", field.as_str());
    let client =
        SpaceTrackClient::new(&config.space_track, config.output.format)?.with_date_field(field);
    let mut harvester = retrieval::harvester(client, &config.retrieval);
    let summary = harvester.run(&range, chunk, &mut sink).await?;
    Ok(Some(summary))
}

/// Handles `satcat`: a single request for the whole catalog or a list of ids
async fn handle_satcat(
    config: &Config,
    ids: Vec<u32>,
    output: Option<&Path>,
    dry_run: bool,
) -> gp_harvest::Result<Option<RetrievalSummary>> {
    let selection = SatcatSelection::from_ids(ids);
    let (mut sink, target) = satcat_target(config, output)?;

    if dry_run {
        println!("=== gp-harvest Dry Run ===\n");
        println!("SATCAT: {}", selection);
        println!("  -> {}", sink.target_path(&target).display());
        return Ok(None);
    }

    let client = SpaceTrackClient::new(&config.space_track, config.output.format)?;
    let mut harvester = retrieval::harvester(client, &config.retrieval);
    let summary = harvester.run_single(&selection, &target, &mut sink).await;
    Ok(Some(summary))
}

/// Sink and target name for a SATCAT download
///
/// Without `-o` the file goes to the download directory as
/// `satcat-YYYYmmddHHMMSS`. With it, the parent directory becomes the sink
/// directory and the file stem the target.
fn satcat_target(config: &Config, output: Option<&Path>) -> gp_harvest::Result<(FileSink, String)> {
    let sink = FileSink::from_config(&config.output);

    let Some(output) = output else {
        let target = format!("satcat-{}", Local::now().format("%Y%m%d%H%M%S"));
        return Ok((sink, target));
    };

    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HarvestError::OutputPath(output.to_path_buf()))?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let sink = FileSink::new(dir, config.output.format)
        .with_compression(config.output.compress)
        .with_overwrite(config.output.overwrite);
    Ok((sink, stem.to_string()))
}

/// Prints the chunks a run would request and the files it would write
fn print_plan<T: RangeElement>(
    range: &CatalogRange<T>,
    chunk: u64,
    sink: &FileSink,
) -> gp_harvest::Result<()> {
    let chunks = partition(range, chunk)?;

    println!("=== gp-harvest Dry Run ===\n");
    println!("Start: {}", range.start());
    println!("End: {}", range.end());
    println!("Number of {}: {}", T::UNIT_NAME, range.len());
    println!("Number of files: {}\n", chunks.total());

    for chunk in chunks {
        println!(
            "  ({}/{}) {} -> {}",
            chunk.index,
            chunk.total,
            chunk.key,
            sink.target_path(&chunk.target_name()).display()
        );
    }

    Ok(())
}
