use crate::highlight::{SpanId, Speaker};
use crate::tui::app::{App, DetailPage, Focus, ListPage, Page, VisualLine};
use crate::tui::markup::Piece;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::path::Path;

/// Rows taken by the location bar
const LOCATION_HEIGHT: u16 = 3;
/// Rows taken by the status bar
const STATUS_HEIGHT: u16 = 1;
/// Rows taken by the detail header (title + metadata)
const HEADER_HEIGHT: u16 = 4;

/// Inner size of the detail body for a terminal of the given size
pub fn body_size(width: u16, height: u16) -> (usize, usize) {
    let width = width.saturating_sub(2);
    let height = height.saturating_sub(LOCATION_HEIGHT + STATUS_HEIGHT + HEADER_HEIGHT + 2);
    (width as usize, height as usize)
}

pub fn draw_loading(f: &mut Frame, archive: &Path) {
    let text = Paragraph::new(format!("Loading archive from {} ...", archive.display()))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" arcview "));
    f.render_widget(text, f.area());
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(LOCATION_HEIGHT), // Location bar
            Constraint::Min(5),                  // Active view
            Constraint::Length(STATUS_HEIGHT),   // Status bar
        ])
        .split(f.area());

    draw_location_bar(f, app, chunks[0]);

    match &app.screen.page {
        Page::Loading => {}
        Page::List(list) => draw_list(f, list, chunks[1]),
        Page::Detail(detail) => draw_detail(f, detail, app.next_key(), chunks[1]),
        Page::Fatal(error) => draw_fatal(f, error, chunks[1]),
    }

    draw_status_bar(f, app, chunks[2]);

    if app.focus == Focus::Help {
        draw_help(f, app.next_key());
    }
}

fn draw_location_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.focus {
        Focus::Location(input) => (input.as_str(), Style::default().fg(Color::Yellow)),
        _ => (app.screen.location.as_str(), Style::default().fg(Color::Blue)),
    };

    let bar = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Location (Ctrl+L: edit, Alt+Left: back, Ctrl+Q: quit) "),
    );
    f.render_widget(bar, area);

    if let Focus::Location(input) = &app.focus {
        f.set_cursor_position((area.x + input.chars().count() as u16 + 1, area.y + 1));
    }
}

fn draw_list(f: &mut Frame, list: &ListPage, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input = Paragraph::new(list.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Search [{}] (Tab: mode, Enter: open, Esc: clear/quit) ",
            list.mode.label()
        )));
    f.render_widget(input, chunks[0]);
    f.set_cursor_position((
        chunks[0].x + list.query.chars().count() as u16 + 1,
        chunks[0].y + 1,
    ));

    if list.no_results {
        let empty = Paragraph::new("No results found")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Conversations (0) "));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let count_style = Style::default().fg(Color::DarkGray);
    let items: Vec<ListItem> = list
        .visible_rows()
        .map(|row| {
            let mut spans = title_spans(&row.title);
            spans.push(Span::styled(format!("  ({} msgs)", row.msg_count), count_style));
            ListItem::new(Line::from(spans))
        })
        .collect();
    let count = items.len();

    let results = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Conversations ({}) ", count)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if count > 0 {
        state.select(Some(list.selected));
    }
    f.render_stateful_widget(results, chunks[1], &mut state);
}

fn title_spans(pieces: &[Piece]) -> Vec<Span<'_>> {
    pieces
        .iter()
        .map(|piece| {
            if piece.marked {
                Span::styled(piece.text.as_str(), mark_style())
            } else {
                Span::raw(piece.text.as_str())
            }
        })
        .collect()
}

fn mark_style() -> Style {
    Style::default().fg(Color::Black).bg(Color::Yellow)
}

fn current_mark_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightRed)
        .add_modifier(Modifier::BOLD)
}

fn speaker_style(speaker: Speaker) -> Style {
    let color = match speaker {
        Speaker::Prompt => Color::Green,
        Speaker::Response => Color::Magenta,
        Speaker::Plain => Color::Blue,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_detail(f: &mut Frame, detail: &DetailPage, next_key: char, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(3)])
        .split(area);

    let header = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            detail.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(detail.meta.as_str(), Style::default().fg(Color::DarkGray))),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Conversation (Esc: back to index) "),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(header, chunks[0]);

    let height = chunks[1].height.saturating_sub(2) as usize;
    let lines: Vec<Line> = detail
        .lines
        .iter()
        .skip(detail.scroll)
        .take(height)
        .map(|line| body_line(line, detail.current))
        .collect();

    let title = match detail.next_label.as_deref() {
        Some(label) => format!(" Line {}/{} · {label} [{next_key}/Enter] ", detail.scroll + 1, detail.lines.len()),
        None => format!(" Line {}/{} ", detail.scroll + 1, detail.lines.len()),
    };
    let body = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, chunks[1]);

    if detail.floating_nav {
        draw_floating_nav(f, detail, next_key, chunks[1]);
    }
}

fn body_line(line: &VisualLine, current: Option<SpanId>) -> Line<'_> {
    match line {
        VisualLine::Heading(text, speaker) => {
            Line::from(Span::styled(text.as_str(), speaker_style(*speaker)))
        }
        VisualLine::Text(pieces) => Line::from(
            pieces
                .iter()
                .map(|piece| match (piece.marked, piece.span) {
                    (true, Some(span)) if Some(span) == current => {
                        Span::styled(piece.text.as_str(), current_mark_style())
                    }
                    (true, _) => Span::styled(piece.text.as_str(), mark_style()),
                    (false, _) => Span::raw(piece.text.as_str()),
                })
                .collect::<Vec<_>>(),
        ),
        VisualLine::Blank => Line::default(),
    }
}

/// Small overlay in the body's top-right corner, shown once scrolled down
fn draw_floating_nav(f: &mut Frame, detail: &DetailPage, next_key: char, area: Rect) {
    let mut text = String::from(" t: top · Esc: index ");
    if detail.next_label.is_some() {
        text.push_str(&format!("· {next_key}: next "));
    }

    let width = (text.chars().count() as u16 + 2).min(area.width);
    let nav_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: 3.min(area.height),
    };

    let nav = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(Clear, nav_area);
    f.render_widget(nav, nav_area);
}

fn draw_fatal(f: &mut Frame, error: &str, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "The archive could not be loaded.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(error),
        Line::default(),
        Line::from(Span::styled("Press q to quit.", Style::default().fg(Color::DarkGray))),
    ]);

    let fatal = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Error "))
        .wrap(Wrap { trim: false });
    f.render_widget(fatal, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status = match &app.screen.page {
        Page::List(list) => match list.selected_row() {
            Some(row) => format!("{} · {}", app.status_message, row.href),
            None => app.status_message.clone(),
        },
        Page::Detail(detail) => format!("{} highlights · F1: help", detail.span_count),
        _ => app.status_message.clone(),
    };

    let status = Paragraph::new(status).style(Style::default().fg(Color::Cyan));
    f.render_widget(status, area);
}

fn draw_help(f: &mut Frame, next_key: char) {
    let area = centered(f.area(), 60, 18);
    let lines = vec![
        Line::from(Span::styled("List", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  type          filter conversations"),
        Line::from("  Tab           switch words / pattern matching"),
        Line::from("  Up/Down       select   Enter  open"),
        Line::from("  Esc           clear query, then quit"),
        Line::default(),
        Line::from(Span::styled("Conversation", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("  {next_key} / Enter     next highlighted match")),
        Line::from("  j/k  PgUp/PgDn  scroll   g/t  back to top"),
        Line::from("  Esc / b       back to the list"),
        Line::default(),
        Line::from(Span::styled("Anywhere", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Ctrl+L        edit location   Alt+Left  back"),
        Line::from("  Ctrl+Q        quit"),
    ];

    let help = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Help (any key to close) "));
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
