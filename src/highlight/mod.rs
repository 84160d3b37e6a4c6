//! Match highlighting.
//!
//! - [`locate`] - literal, case-insensitive match ranges
//! - [`markup`] - segments, HTML escaping and marker injection
//! - [`content`] - splitting record content into message blocks
//! - [`cursor`] - the "next occurrence" cursor over highlight spans

pub mod content;
pub mod cursor;
pub mod locate;
pub mod markup;

pub use content::{render_content, MessageBlock, RenderedContent, Speaker};
pub use cursor::{HighlightCursor, HighlightSurface};
pub use locate::find_matches;
pub use markup::{
    escape_html, highlight_title, segment, segments_to_html, title_segments, Segment, SpanId,
    HIGHLIGHT_CLASS, TITLE_MIN_LEN,
};
