#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! In-process cache partitioned by tenant.
//!
//! Values are stored as JSON so any `Serialize`/`DeserializeOwned` type can be
//! cached under a string key. Partitions never leak into each other: a key set
//! for one tenant is a miss for every other tenant.

mod cache;
mod error;

pub use cache::{LocalCache, TenantCache};
pub use error::CacheError;
