//! Output formatting for one-shot `arcview search` results

use crate::highlight::{title_segments, Segment};
use crate::index::Record;
use crate::router::Location;
use crate::utils::format_thousands;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One machine-readable search result
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchRow<'a> {
    pub id: u32,
    pub title: &'a str,
    pub msg_count: u32,
    pub filesize: u64,
    /// Fragment that opens this conversation with the query carried
    pub href: String,
}

impl<'a> SearchRow<'a> {
    pub fn new(record: &'a Record, query: &str) -> Self {
        let carried = (!query.is_empty()).then(|| query.to_string());
        Self {
            id: record.id,
            title: &record.title,
            msg_count: record.msg_count,
            filesize: record.filesize,
            href: Location::detail(record.id, carried).to_fragment(),
        }
    }
}

/// Print matching records one per line, with query terms in the title highlighted
pub fn print_search_results(records: &[&Record], query: &str, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for record in records {
        // Record id
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{:>6}", record.id)?;
        stdout.reset()?;
        write!(stdout, "  ")?;

        print_title(&mut stdout, &record.title, query)?;

        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(
            stdout,
            "  ({} msgs, {} bytes)",
            record.msg_count,
            format_thousands(record.filesize)
        )?;
        stdout.reset()?;
    }

    Ok(())
}

fn print_title(stdout: &mut StandardStream, title: &str, query: &str) -> io::Result<()> {
    for segment in title_segments(title, query) {
        match segment {
            Segment::Text { text } => write!(stdout, "{}", text)?,
            Segment::Mark { text, .. } => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(stdout, "{}", text)?;
                stdout.reset()?;
            }
        }
    }
    Ok(())
}

/// Print results as a JSON array (for --json)
pub fn print_search_json(records: &[&Record], query: &str) -> anyhow::Result<()> {
    let rows: Vec<SearchRow<'_>> = records.iter().map(|r| SearchRow::new(r, query)).collect();
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &rows)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            id: 12,
            title: "Rust proxy".to_string(),
            msg_count: 4,
            filesize: 2048,
            content: String::new(),
        }
    }

    #[test]
    fn test_search_row_carries_query() {
        let record = record();
        let row = SearchRow::new(&record, "C++ & Go");
        assert_eq!(row.href, "#/chat/12?q=C%2B%2B%20%26%20Go");
    }

    #[test]
    fn test_search_row_without_query() {
        let record = record();
        let row = SearchRow::new(&record, "");
        assert_eq!(row.href, "#/chat/12");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["title"], "Rust proxy");
        assert_eq!(json["msg_count"], 4);
    }
}
