//! Space-Track query paths
//!
//! Builds the `basicspacedata/query` REST paths for each supported request
//! class. Every query orders its results by catalog number first so that the
//! same chunk always yields the same payload.

use crate::config::PayloadFormat;
use crate::range::ChunkKey;
use crate::source::SourceError;
use chrono::{Days, NaiveDate};
use std::fmt;

/// Request class for catalog-number chunks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum IdClass {
    /// Full GP element set history
    #[default]
    GpHistory,
    /// Legacy TLE history
    Tle,
}

impl IdClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GpHistory => "gp_history",
            Self::Tle => "tle",
        }
    }
}

/// Timestamp field selected by date chunks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateField {
    /// Epoch of the element set
    #[default]
    Epoch,
    /// When the element set was published
    CreationDate,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epoch => "EPOCH",
            Self::CreationDate => "CREATION_DATE",
        }
    }
}

/// Which SATCAT records to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatcatSelection {
    All,
    Ids(Vec<u32>),
}

impl SatcatSelection {
    pub fn from_ids(ids: Vec<u32>) -> Self {
        if ids.is_empty() {
            Self::All
        } else {
            Self::Ids(ids)
        }
    }
}

impl fmt::Display for SatcatSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Ids(ids) => {
                let joined: Vec<String> = ids.iter().map(u32::to_string).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

/// Path for a chunk of NORAD catalog numbers
pub fn catalog_query_path(class: IdClass, key: &ChunkKey<u32>, format: PayloadFormat) -> String {
    format!(
        "basicspacedata/query/class/{}/NORAD_CAT_ID/{}/orderby/NORAD_CAT_ID,EPOCH/format/{}",
        class.as_str(),
        key,
        format.as_str()
    )
}

/// Path for a chunk of days over the given timestamp field
pub fn date_query_path(
    field: DateField,
    key: &ChunkKey<NaiveDate>,
    format: PayloadFormat,
) -> Result<String, SourceError> {
    Ok(format!(
        "basicspacedata/query/class/gp_history/{}/{}/orderby/NORAD_CAT_ID,{}/format/{}",
        field.as_str(),
        date_predicate(key)?,
        field.as_str(),
        format.as_str()
    ))
}

/// Path for a SATCAT download
pub fn satcat_query_path(selection: &SatcatSelection, format: PayloadFormat) -> String {
    match selection {
        SatcatSelection::All => format!(
            "basicspacedata/query/class/satcat/orderby/NORAD_CAT_ID/format/{}",
            format.as_str()
        ),
        SatcatSelection::Ids(_) => format!(
            "basicspacedata/query/class/satcat/NORAD_CAT_ID/{}/orderby/NORAD_CAT_ID/format/{}",
            selection,
            format.as_str()
        ),
    }
}

/// Renders a day chunk as a timestamp range
///
/// Date fields are timestamps, so the upper bound is the day after the
/// chunk's last day; a scalar day becomes `d--d+1`. A chunk ending on the
/// last representable day has no upper bound and is rejected.
pub fn date_predicate(key: &ChunkKey<NaiveDate>) -> Result<String, SourceError> {
    let upper = key
        .last()
        .checked_add_days(Days::new(1))
        .ok_or_else(|| SourceError::Rejected(format!("no day after {}", key.last())))?;
    Ok(format!("{}--{}", key.first(), upper))
}
