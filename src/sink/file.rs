//! File system sink with optional gzip compression

use crate::config::{OutputConfig, PayloadFormat};
use crate::sink::Sink;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes each payload to `<dir>/<target>.<ext>[.gz]`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    extension: &'static str,
    compress: bool,
    overwrite: bool,
}

impl FileSink {
    /// Creates a sink that compresses and never replaces existing files
    pub fn new(dir: impl Into<PathBuf>, format: PayloadFormat) -> Self {
        Self {
            dir: dir.into(),
            extension: format.as_str(),
            compress: true,
            overwrite: false,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.download_dir, config.format)
            .with_compression(config.compress)
            .with_overwrite(config.overwrite)
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of the file written for `target`
    pub fn target_path(&self, target: &str) -> PathBuf {
        let mut name = format!("{}.{}", target, self.extension);
        if self.compress {
            name.push_str(".gz");
        }
        self.dir.join(name)
    }

    fn write(&self, payload: &str, path: &Path) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let file = BufWriter::new(File::create(path)?);
        if self.compress {
            let mut encoder = GzEncoder::new(file, Compression::best());
            encoder.write_all(payload.as_bytes())?;
            encoder.finish()?.flush()?;
        } else {
            let mut file = file;
            file.write_all(payload.as_bytes())?;
            file.flush()?;
        }

        Ok(())
    }
}

impl Sink for FileSink {
    fn persist(&mut self, payload: &str, target: &str) -> bool {
        let path = self.target_path(target);

        if !self.overwrite && path.exists() {
            tracing::error!("{} already exists", path.display());
            return false;
        }

        match self.write(payload, &path) {
            Ok(()) => {
                tracing::debug!("Saved {} ({} bytes)", path.display(), payload.len());
                true
            }
            Err(e) => {
                tracing::error!("Failed to write {}: {}", path.display(), e);
                // A truncated file would block the next run
                if let Err(e) = fs::remove_file(&path) {
                    if e.kind() != io::ErrorKind::NotFound {
                        tracing::warn!("Failed to remove partial file {}: {}", path.display(), e);
                    }
                }
                false
            }
        }
    }
}
