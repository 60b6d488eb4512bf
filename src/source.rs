//! Getting the booking export text into memory.
use crate::{sample, Config, LoadSummary, Records, Tabulation};
use qu::ick_use::*;
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

/// Where the booking export text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    /// The built-in sample.
    Sample,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "\"{}\"", path.display()),
            Source::Sample => f.write_str("built-in sample"),
        }
    }
}

impl Source {
    /// Read the export named in `config`.
    ///
    /// Returns `None` (no data available) if the file doesn't exist and we aren't allowed to use
    /// the sample. Any other I/O error is returned.
    pub fn read(config: &Config) -> Result<Option<(Source, String)>> {
        match read_file(&config.data_path)? {
            Some(text) => Ok(Some((Source::File(config.data_path.clone()), text))),
            None if config.fallback_to_sample => {
                event!(
                    Level::WARN,
                    "no booking export at \"{}\", using the built-in sample",
                    config.data_path.display()
                );
                Ok(Some((Source::Sample, sample::TEXT.to_owned())))
            }
            None => {
                event!(
                    Level::WARN,
                    "no booking export at \"{}\"",
                    config.data_path.display()
                );
                Ok(None)
            }
        }
    }
}

fn read_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => Ok(None),
        Err(e) => Err(Error::from(e))
            .with_context(|| format!("reading booking export \"{}\"", path.display())),
    }
}

/// A loaded booking export.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: Source,
    pub records: Records,
    pub summary: LoadSummary,
}

impl Dataset {
    /// Load the export named in `config`. `None` means no data is available.
    pub fn load(config: &Config) -> Result<Option<Self>> {
        Ok(Source::read(config)?.map(|(source, text)| Self::from_text(source, &text)))
    }

    pub fn from_text(source: Source, text: &str) -> Self {
        let (records, summary) = Records::parse(text);
        Dataset {
            source,
            records,
            summary,
        }
    }

    /// Count everything, keeping the load summary.
    pub fn tabulate(&self) -> Tabulation {
        self.tabulate_records(&self.records)
    }

    /// Count a subset of the records (e.g. after filtering), keeping the load summary.
    pub fn tabulate_records(&self, records: &Records) -> Tabulation {
        let mut tab = Tabulation::from_records(records);
        tab.summary = self.summary.clone();
        tab
    }
}
