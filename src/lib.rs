//! # arcview - offline chat archive browser
//!
//! arcview loads a pre-built archive of chat transcripts (three JSON
//! documents) into memory once and serves everything from there: filtering
//! the conversation list as you type, opening a conversation with the
//! query's occurrences highlighted, and stepping through those occurrences.
//! All navigation state lives in a `#/chat/<id>?q=` style fragment.
//!
//! ## Architecture
//!
//! - [`index`] - archive loading ([`index::StoreHandle`]), building and stats
//! - [`query`] - token and substring evaluation into match sets
//! - [`highlight`] - escaping, match highlighting and the occurrence cursor
//! - [`router`] - fragment grammar, history and listener scopes
//! - [`session`] - views, render instructions and UI event dispatch
//! - [`tui`] - interactive terminal browser
//! - [`output`] - one-shot search result formatting
//! - [`utils`] - config, logging, tokenizing and formatting helpers
//!
//! ## Quick Start
//!
//! ```ignore
//! use arcview::index::StoreHandle;
//! use arcview::query::{sorted_matches, QueryEvaluator, SearchMode};
//! use std::path::Path;
//!
//! let store = StoreHandle::open(Path::new("public"))?;
//! let matches = QueryEvaluator::new(&store).evaluate("rust proxy", SearchMode::Token);
//!
//! for record in sorted_matches(&store, &matches) {
//!     println!("{} ({} messages)", record.title, record.msg_count);
//! }
//! ```

pub mod highlight;
pub mod index;
pub mod output;
pub mod query;
pub mod router;
pub mod session;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
