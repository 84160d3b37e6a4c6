//! Utility functions shared across arcview:
//!
//! - [`app_data`] - configuration and the per-OS app data directory
//! - [`format`] - number and size formatting
//! - [`logging`] - `tracing` subscriber setup
//! - [`progress`] - build progress bars behind the `progress` feature
//! - [`tokenizer`] - archive token extraction and query term splitting
//!
//! ```no_run
//! use arcview::utils::extract_tokens;
//!
//! let tokens = extract_tokens("A discussion of caching layers");
//! // Returns: {"discussion", "caching", "layers"}
//! ```

pub mod app_data;
pub mod format;
pub mod logging;
pub mod progress;
pub mod tokenizer;

pub use app_data::*;
pub use format::*;
pub use tokenizer::*;
