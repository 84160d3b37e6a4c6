//! Decoder for the small markup language the engine emits: escaped text,
//! `<br>` line breaks and `<mark ... data-span="N">` highlight markers.

use crate::highlight::SpanId;

/// A run of decoded text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub text: String,
    /// Inside a highlight marker
    pub marked: bool,
    /// Span id of the enclosing marker, if it carried one
    pub span: Option<SpanId>,
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            marked: false,
            span: None,
        }
    }
}

/// One display line made of pieces
pub type PieceLine = Vec<Piece>;

/// Decode markup into lines of pieces. Unknown tags are dropped, unknown
/// entities kept as written.
pub fn decode(markup: &str) -> Vec<PieceLine> {
    let mut lines = vec![PieceLine::new()];
    let mut text = String::new();
    let mut marked = false;
    let mut span = None;

    let flush = |lines: &mut Vec<PieceLine>, text: &mut String, marked: bool, span: Option<SpanId>| {
        if !text.is_empty() {
            if let Some(line) = lines.last_mut() {
                line.push(Piece {
                    text: std::mem::take(text),
                    marked,
                    span,
                });
            }
        }
    };

    let mut rest = markup;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => {
                let Some(end) = rest.find('>') else {
                    text.push_str(rest);
                    break;
                };
                let tag = &rest[1..end];
                rest = &rest[end + 1..];

                if tag == "br" || tag == "br/" || tag == "br /" {
                    flush(&mut lines, &mut text, marked, span);
                    lines.push(PieceLine::new());
                } else if tag == "mark" || tag.starts_with("mark ") {
                    flush(&mut lines, &mut text, marked, span);
                    marked = true;
                    span = attribute(tag, "data-span").and_then(|v| v.parse().ok());
                } else if tag == "/mark" {
                    flush(&mut lines, &mut text, marked, span);
                    marked = false;
                    span = None;
                }
            }
            '&' => {
                let decoded = rest
                    .char_indices()
                    .take(10)
                    .find(|&(_, c)| c == ';')
                    .and_then(|(end, _)| entity(&rest[1..end]).map(|c| (c, end)));
                match decoded {
                    Some((c, end)) => {
                        text.push(c);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        text.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                text.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    flush(&mut lines, &mut text, marked, span);
    lines
}

/// Decode markup that is known to be a single line, e.g. a title
pub fn decode_line(markup: &str) -> PieceLine {
    decode(markup).into_iter().flatten().collect()
}

/// Text of a decoded line without styling
pub fn plain_text(line: &[Piece]) -> String {
    line.iter().map(|p| p.text.as_str()).collect()
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "#39" | "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix("#x").map_or_else(
                || name.strip_prefix('#').and_then(|d| d.parse().ok()),
                |hex| u32::from_str_radix(hex, 16).ok(),
            )?;
            char::from_u32(code)
        }
    }
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let start = tag.find(&format!("{name}=\""))? + name.len() + 2;
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Hard-wrap a line to at most `width` characters per row
pub fn wrap(line: &[Piece], width: usize) -> Vec<PieceLine> {
    let width = width.max(1);
    let mut rows = vec![PieceLine::new()];
    let mut used = 0;

    for piece in line {
        let mut chars = piece.text.chars().peekable();
        while chars.peek().is_some() {
            if used == width {
                rows.push(PieceLine::new());
                used = 0;
            }
            let chunk: String = chars.by_ref().take(width - used).collect();
            used += chunk.chars().count();
            if let Some(row) = rows.last_mut() {
                row.push(Piece {
                    text: chunk,
                    ..piece.clone()
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        let lines = decode("R&amp;D &lt;b&gt; &quot;x&quot; it&#39;s");
        assert_eq!(lines.len(), 1);
        assert_eq!(plain_text(&lines[0]), "R&D <b> \"x\" it's");
    }

    #[test]
    fn test_decode_breaks() {
        let lines = decode("one<br>two<br>");
        assert_eq!(lines.len(), 3);
        assert_eq!(plain_text(&lines[1]), "two");
        assert!(lines[2].is_empty());
    }

    #[test]
    fn test_decode_marks() {
        let line = decode_line(r#"a <mark class="highlight" data-span="3">Rust</mark> b"#);
        assert_eq!(line.len(), 3);
        assert_eq!(line[1].text, "Rust");
        assert!(line[1].marked);
        assert_eq!(line[1].span, Some(3));
        assert!(!line[2].marked);
    }

    #[test]
    fn test_mark_across_break() {
        let lines = decode(r#"<mark class="highlight" data-span="0">a<br>b</mark>"#);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].span, Some(0));
        assert_eq!(lines[1][0].span, Some(0));
    }

    #[test]
    fn test_bare_ampersand_kept() {
        assert_eq!(plain_text(&decode_line("fish & chips")), "fish & chips");
    }

    #[test]
    fn test_wrap() {
        let line = vec![Piece::from("abcd"), Piece::from("efg")];
        let rows = wrap(&line, 3);
        let texts: Vec<_> = rows.iter().map(|r| plain_text(r)).collect();
        assert_eq!(texts, vec!["abc", "def", "g"]);
    }
}
