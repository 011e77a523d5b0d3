//! Requested ranges and their partitioning into request-sized chunks
//!
//! This module contains:
//! - `CatalogRange`, an inclusive range of catalog numbers or days
//! - Chunk partitioning and the predicate key sent for each chunk
//! - Parsing of the date forms accepted on the command line

mod partition;

pub use partition::{partition, Chunk, ChunkKey, Partition};

use crate::RangeError;
use chrono::{Days, NaiveDate};
use std::fmt;

/// An element type that can be partitioned into chunks
///
/// Implemented for NORAD catalog numbers (`u32`) and calendar days
/// (`NaiveDate`).
pub trait RangeElement: Copy + Ord + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Plural noun for the elements, used in progress logs
    const UNIT_NAME: &'static str;

    /// Number of elements in `first..=last`; requires `first <= last`
    fn span(first: Self, last: Self) -> u64;

    /// The element `n` steps after `self`
    ///
    /// Callers never step past the end of a valid range.
    fn forward(self, n: u64) -> Self;

    /// File name fragment identifying this element
    fn file_stem(&self) -> String;
}

impl RangeElement for u32 {
    const UNIT_NAME: &'static str = "satellites";

    fn span(first: Self, last: Self) -> u64 {
        u64::from(last - first) + 1
    }

    fn forward(self, n: u64) -> Self {
        self + n as u32
    }

    fn file_stem(&self) -> String {
        self.to_string()
    }
}

impl RangeElement for NaiveDate {
    const UNIT_NAME: &'static str = "days";

    fn span(first: Self, last: Self) -> u64 {
        (last - first).num_days() as u64 + 1
    }

    fn forward(self, n: u64) -> Self {
        self + Days::new(n)
    }

    fn file_stem(&self) -> String {
        self.format("%Y%m%d").to_string()
    }
}

/// An inclusive range `start..=end` with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogRange<T> {
    start: T,
    end: T,
}

impl<T: RangeElement> CatalogRange<T> {
    /// Creates a range, swapping the bounds if they are reversed
    pub fn new(start: T, end: T) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// A range holding a single element
    pub fn single(value: T) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    /// Number of elements in the range
    pub fn len(&self) -> u64 {
        T::span(self.start, self.end)
    }

    /// Always false: a range holds at least one element
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Parses a command-line date into a calendar day
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and `YYYYMMDD`. A trailing time part
/// (`2024-03-01T12:00:00`, `2024-03-01 12:00`) is ignored, which truncates
/// the value to its day.
///
/// The last representable day is rejected: date queries end at the day
/// after the range.
pub fn parse_date(input: &str) -> Result<NaiveDate, RangeError> {
    let trimmed = input.trim();
    let day_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);

    ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
        .filter(|day| day.checked_add_days(Days::new(1)).is_some())
        .ok_or_else(|| RangeError::InvalidDate(input.to_string()))
}
