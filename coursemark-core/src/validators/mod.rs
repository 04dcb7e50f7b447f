//! Checks that run once over the whole pass, after parsing and flattening.
//!
//! Validators only read their inputs and return diagnostics.

pub mod directories;
pub mod output;
pub mod slugs;
pub mod timestamps;
pub mod uuids;

pub use directories::validate_directories;
pub use output::validate_output;
pub use slugs::{validate_slugs, SlugEntry};
pub use timestamps::validate_timestamp_pairs;
pub use uuids::{validate_uuids, UuidEntry};
