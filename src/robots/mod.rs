//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files. Every fetch consults [`PolicyCache`] first.

mod cache;
mod parser;

pub use cache::{fetch_robots, PolicyCache};
pub use parser::{robots_token, ParsedRobots};
