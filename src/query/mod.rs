pub mod evaluator;
pub mod mode;

pub use evaluator::{sorted_matches, MatchSet, QueryEvaluator, SUBSTRING_MIN_LEN};
pub use mode::{normalize_query, QueryState, SearchMode};
