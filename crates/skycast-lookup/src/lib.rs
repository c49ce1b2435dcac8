//! Lookup orchestration for Skycast
//!
//! Decides whether a request is served from the cache or fetched live,
//! and records every successful outcome to the history ledger.

pub mod keys;
pub mod service;

pub use keys::{city_key, coords_key};
pub use service::{LookupOutcome, LookupService};
