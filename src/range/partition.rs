use crate::range::{CatalogRange, RangeElement};
use crate::RangeError;
use std::fmt;

/// The predicate value sent to the data source for one chunk
///
/// A single-element chunk is always a scalar; the provider's query language
/// treats single values and ranges differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKey<T> {
    /// Exactly one element
    Scalar(T),
    /// `first..=last` with `first < last`
    Inclusive(T, T),
}

impl<T: RangeElement> ChunkKey<T> {
    fn from_bounds(first: T, last: T) -> Self {
        if first == last {
            Self::Scalar(first)
        } else {
            Self::Inclusive(first, last)
        }
    }

    pub fn first(&self) -> T {
        match self {
            Self::Scalar(v) | Self::Inclusive(v, _) => *v,
        }
    }

    pub fn last(&self) -> T {
        match self {
            Self::Scalar(v) | Self::Inclusive(_, v) => *v,
        }
    }

    /// Deterministic target name for the chunk's file, without extension
    ///
    /// `25544` for a scalar, `1-100` for a range; dates use `YYYYMMDD`.
    pub fn target_name(&self) -> String {
        match self {
            Self::Scalar(v) => v.file_stem(),
            Self::Inclusive(first, last) => format!("{}-{}", first.file_stem(), last.file_stem()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for ChunkKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{}", v),
            Self::Inclusive(first, last) => write!(f, "{}--{}", first, last),
        }
    }
}

/// One request-sized sub-range of a `CatalogRange`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<T> {
    /// 1-based position in the partition
    pub index: u64,
    /// Number of chunks in the partition
    pub total: u64,
    pub key: ChunkKey<T>,
}

impl<T: RangeElement> Chunk<T> {
    /// Number of elements covered by this chunk
    pub fn len(&self) -> u64 {
        T::span(self.key.first(), self.key.last())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn target_name(&self) -> String {
        self.key.target_name()
    }
}

/// Ordered iterator over the chunks of a range
#[derive(Debug, Clone)]
pub struct Partition<T> {
    start: T,
    len: u64,
    unit: u64,
    total: u64,
    next: u64,
}

impl<T: RangeElement> Partition<T> {
    /// Number of chunks in the whole partition
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl<T: RangeElement> Iterator for Partition<T> {
    type Item = Chunk<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }

        // next < total, so offset < len and cannot overflow
        let offset = self.next * self.unit;
        let size = self.unit.min(self.len - offset);
        let first = self.start.forward(offset);
        let last = first.forward(size - 1);

        self.next += 1;

        Some(Chunk {
            index: self.next,
            total: self.total,
            key: ChunkKey::from_bounds(first, last),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<T: RangeElement> ExactSizeIterator for Partition<T> {}

/// Splits a range into ordered chunks of at most `unit` elements
///
/// The chunks are contiguous, never overlap and cover every element of the
/// range exactly once. Only the last chunk may be shorter than `unit`.
///
/// # Arguments
///
/// * `range` - The range to split
/// * `unit` - Maximum chunk size, in catalog numbers or days
///
/// # Returns
///
/// * `Ok(Partition)` - `ceil(range.len() / unit)` chunks
/// * `Err(RangeError::ZeroUnit)` - `unit` was zero
///
/// # Example
///
/// ```
/// use gp_harvest::range::{partition, CatalogRange};
///
/// let chunks: Vec<String> = partition(&CatalogRange::new(1u32, 10), 3)
///     .unwrap()
///     .map(|chunk| chunk.key.to_string())
///     .collect();
///
/// assert_eq!(chunks, ["1--3", "4--6", "7--9", "10"]);
/// ```
pub fn partition<T: RangeElement>(
    range: &CatalogRange<T>,
    unit: u64,
) -> Result<Partition<T>, RangeError> {
    if unit == 0 {
        return Err(RangeError::ZeroUnit);
    }

    let len = range.len();
    let total = len / unit + u64::from(len % unit != 0);

    Ok(Partition {
        start: range.start(),
        len,
        unit,
        total,
        next: 0,
    })
}
