//! Logging setup
//!
//! Two tracing layers: a concise console layer on stderr filtered by the
//! requested verbosity, and a per-invocation log file at debug level with
//! source locations.

use chrono::Local;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Console filter for the given verbosity flags
pub fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gp_harvest=info,warn"),
            1 => EnvFilter::new("gp_harvest=debug,info"),
            2 => EnvFilter::new("gp_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

/// Log file filter: this crate at debug, dependencies at info
pub fn file_filter() -> EnvFilter {
    EnvFilter::new("gp_harvest=debug,info")
}

/// Layer writing plain-text events with source locations to `file`
pub fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(file_filter())
}

/// Path of the log file for one invocation: `<dir>/<name>-YYYYmmddHHMMSS.log`
pub fn log_file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}-{}.log", name, Local::now().format("%Y%m%d%H%M%S")))
}

/// Creates the log directory and the log file
pub fn open_log_file(dir: &Path, name: &str) -> io::Result<(PathBuf, File)> {
    fs::create_dir_all(dir)?;
    let path = log_file_path(dir, name);
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Sets up the global tracing subscriber
///
/// # Arguments
///
/// * `verbose` - Number of `-v` flags
/// * `quiet` - Only show errors on the console
/// * `log_file` - Optional file receiving this crate's debug-level events
pub fn setup_logging(verbose: u8, quiet: bool, log_file: Option<File>) {
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console_filter(verbose, quiet));

    tracing_subscriber::registry()
        .with(console)
        .with(log_file.map(file_layer))
        .init();
}
