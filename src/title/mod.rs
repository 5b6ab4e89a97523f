//! Title handling
//!
//! Canonicalization of free-form show titles, season inference from title
//! strings, and planning of the search queries sent to a catalog site.

mod normalize;
mod query;
mod season;

pub use normalize::normalize;
pub use query::{QueryPlan, build_queries, build_search_title};
pub use season::{SeasonPattern, infer_season};
