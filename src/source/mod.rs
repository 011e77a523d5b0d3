//! Data sources for orbital records
//!
//! This module contains:
//! - The `DataSource` trait the retrieval engine fetches through
//! - The two-way failure classification driving retries
//! - The Space-Track client and its query paths

pub mod query;
mod spacetrack;
mod traits;

pub use query::{DateField, IdClass, SatcatSelection};
pub use spacetrack::{build_http_client, classify_error, SpaceTrackClient};
pub use traits::{DataSource, SourceError};
