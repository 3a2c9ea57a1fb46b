//! URL handling module for Jobsweep
//!
//! This module provides URL normalization for the visited set, host
//! extraction for politeness bookkeeping, and host allow-list matching.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, host_key, same_host};
pub use matcher::{host_allowed, matches_allow_pattern};
pub use normalize::{normalize_url, visit_key};
