use crate::highlight::locate::find_matches;
use serde::Serialize;

/// Class carried by every highlight marker
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Shortest query that highlights titles in the list view
pub const TITLE_MIN_LEN: usize = 3;

/// Identifier of one highlight span, in document order from 0
pub type SpanId = usize;

/// A piece of raw (unescaped) text, either plain or marked as a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment<'a> {
    Text { text: &'a str },
    Mark { span: SpanId, text: &'a str },
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Text { text } | Segment::Mark { text, .. } => text,
        }
    }

    pub fn span(&self) -> Option<SpanId> {
        match self {
            Segment::Mark { span, .. } => Some(*span),
            Segment::Text { .. } => None,
        }
    }
}

/// Split `text` into plain and marked segments for every literal,
/// case-insensitive occurrence of `query`.
///
/// Span ids are numbered from `first_span`, so a document made of several
/// blocks can keep one document-order numbering.
pub fn segment<'a>(text: &'a str, query: &str, first_span: SpanId) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for (n, range) in find_matches(text, query).into_iter().enumerate() {
        if range.start > cursor {
            segments.push(Segment::Text {
                text: &text[cursor..range.start],
            });
        }
        segments.push(Segment::Mark {
            span: first_span + n,
            text: &text[range.clone()],
        });
        cursor = range.end;
    }

    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::Text {
            text: &text[cursor..],
        });
    }

    segments
}

/// Number of marked spans in a segment list
pub fn span_count(segments: &[Segment<'_>]) -> usize {
    segments.iter().filter(|s| s.span().is_some()).count()
}

/// Escape the five HTML-significant characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape raw text, then turn newlines into `<br>`
fn escape_with_breaks(raw: &str, out: &mut String) {
    let mut lines = raw.split('\n');
    if let Some(first) = lines.next() {
        out.push_str(&escape_html(first));
    }
    for line in lines {
        out.push_str("<br>");
        out.push_str(&escape_html(line));
    }
}

/// Render content segments as HTML.
///
/// Every segment's text is escaped and line-broken before its marker is
/// wrapped around it; marker markup itself is never escaped.
pub fn segments_to_html(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text { text } => escape_with_breaks(text, &mut out),
            Segment::Mark { span, text } => {
                out.push_str(&format!(
                    r#"<mark class="{HIGHLIGHT_CLASS}" data-span="{span}">"#
                ));
                escape_with_breaks(text, &mut out);
                out.push_str("</mark>");
            }
        }
    }
    out
}

/// Render a list-row title with its matches wrapped in highlight markers.
///
/// Titles are highlighted only for queries of at least three characters.
pub fn highlight_title(title: &str, query: &str) -> String {
    let mut out = String::new();
    for segment in title_segments(title, query) {
        match segment {
            Segment::Text { text } => out.push_str(&escape_html(text)),
            Segment::Mark { text, .. } => {
                out.push_str(&format!(r#"<mark class="{HIGHLIGHT_CLASS}">"#));
                out.push_str(&escape_html(text));
                out.push_str("</mark>");
            }
        }
    }
    out
}

/// Segments for a title, honouring the three-character activation floor
pub fn title_segments<'a>(title: &'a str, query: &str) -> Vec<Segment<'a>> {
    let query = query.trim();
    if query.chars().count() < TITLE_MIN_LEN {
        return vec![Segment::Text { text: title }];
    }
    segment(title, query, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_numbering() {
        let segs = segment("one two one", "one", 5);
        assert_eq!(
            segs,
            vec![
                Segment::Mark { span: 5, text: "one" },
                Segment::Text { text: " two " },
                Segment::Mark { span: 6, text: "one" },
            ]
        );
        assert_eq!(span_count(&segs), 2);
    }

    #[test]
    fn test_segment_without_match() {
        assert_eq!(segment("plain", "zzz", 0), vec![Segment::Text { text: "plain" }]);
        assert_eq!(segment("", "zzz", 0), vec![Segment::Text { text: "" }]);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_html_escapes_before_marking() {
        let segs = segment("<script>alert(1)</script> & script", "script", 0);
        let html = segments_to_html(&segs);
        assert_eq!(
            html,
            "&lt;<mark class=\"highlight\" data-span=\"0\">script</mark>&gt;alert(1)&lt;/\
             <mark class=\"highlight\" data-span=\"1\">script</mark>&gt; &amp; \
             <mark class=\"highlight\" data-span=\"2\">script</mark>"
        );
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_query_with_ampersand_is_not_split_by_entities() {
        let segs = segment("R&D budget", "r&d", 0);
        assert_eq!(
            segments_to_html(&segs),
            "<mark class=\"highlight\" data-span=\"0\">R&amp;D</mark> budget"
        );
        // "amp" must not match inside the escaped entity
        assert_eq!(span_count(&segment("R&D", "amp", 0)), 0);
    }

    #[test]
    fn test_line_breaks() {
        let segs = segment("first\nsecond", "zzz", 0);
        assert_eq!(segments_to_html(&segs), "first<br>second");
    }

    #[test]
    fn test_title_threshold() {
        assert_eq!(highlight_title("Rust & Go", "ru"), "Rust &amp; Go");
        assert_eq!(
            highlight_title("Rust & Go", "rus"),
            "<mark class=\"highlight\">Rus</mark>t &amp; Go"
        );
        assert_eq!(
            highlight_title("ΟΔΟΣ guide", "οδος"),
            "<mark class=\"highlight\">ΟΔΟΣ</mark> guide"
        );
    }
}
