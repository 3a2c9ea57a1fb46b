//! State module for tracking crawl progress
//!
//! Each configured site runs its own small state machine
//! (`Seed -> Running -> Exhausted`). The crawl is complete when every site
//! has reached `Exhausted`.

mod site_state;

pub use site_state::SiteState;
