use crate::highlight::markup::{segment, segments_to_html, span_count, Segment, SpanId};
use crate::index::types::{PROMPT_MARKER, RESPONSE_MARKER};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Who wrote a message block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Prompt,
    Response,
    /// Content without any section markers, shown as one block
    Plain,
}

/// One message of a conversation, split into highlight segments
#[derive(Debug, Clone)]
pub struct MessageBlock<'a> {
    pub speaker: Speaker,
    /// 1-based position among the conversation's messages
    pub ordinal: usize,
    pub segments: Vec<Segment<'a>>,
}

impl MessageBlock<'_> {
    pub fn to_html(&self) -> String {
        segments_to_html(&self.segments)
    }

    pub fn span_count(&self) -> usize {
        span_count(&self.segments)
    }
}

/// A record's content split into message blocks with matches marked
#[derive(Debug, Clone, Default)]
pub struct RenderedContent<'a> {
    pub blocks: Vec<MessageBlock<'a>>,
    /// Total highlight spans across all blocks, numbered in document order
    pub span_count: usize,
}

impl<'a> RenderedContent<'a> {
    /// Every span id in document order
    pub fn spans(&self) -> Vec<SpanId> {
        (0..self.span_count).collect()
    }

    /// Index of the block holding a span
    pub fn block_of(&self, span: SpanId) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.segments.iter().any(|s| s.span() == Some(span)))
    }
}

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"## (?:PROMPT|RESPONSE) ##").expect("marker pattern is valid"));

/// Split raw record content into message blocks and mark every occurrence
/// of `query` (case-insensitive, literal).
///
/// Text before the first section marker is not part of any message and is
/// dropped. Content without markers becomes a single [`Speaker::Plain`]
/// block. A blank query marks nothing.
pub fn render_content<'a>(content: &'a str, query: Option<&str>) -> RenderedContent<'a> {
    let query = query.map(str::trim).unwrap_or_default();
    let markers: Vec<_> = MARKER.find_iter(content).collect();

    let mut rendered = RenderedContent::default();

    if markers.is_empty() {
        let segments = segment(content, query, 0);
        rendered.span_count = span_count(&segments);
        rendered.blocks.push(MessageBlock {
            speaker: Speaker::Plain,
            ordinal: 1,
            segments,
        });
        return rendered;
    }

    for (i, marker) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map_or(content.len(), |next| next.start());
        let body = content[marker.end()..body_end].trim();

        let speaker = if marker.as_str() == PROMPT_MARKER {
            Speaker::Prompt
        } else {
            debug_assert_eq!(marker.as_str(), RESPONSE_MARKER);
            Speaker::Response
        };

        let segments = segment(body, query, rendered.span_count);
        rendered.span_count += span_count(&segments);
        rendered.blocks.push(MessageBlock {
            speaker,
            ordinal: i + 1,
            segments,
        });
    }

    rendered
}
