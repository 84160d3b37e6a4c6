use crate::highlight::{HighlightSurface, Speaker, SpanId};
use crate::index::types::RecordId;
use crate::index::LoadError;
use crate::query::SearchMode;
use crate::session::{
    DetailSurface, ListRow, ListSurface, RenderInstruction, Session, Surface, UiEvent,
};
use crate::tui::markup::{decode, decode_line, plain_text, wrap, PieceLine};

/// Lines moved by PageUp / PageDown
const PAGE_LINES: usize = 20;

/// Lines moved by Ctrl+D / Ctrl+U
const HALF_PAGE_LINES: usize = 10;

/// One row of the conversation list
#[derive(Debug, Clone)]
pub struct Row {
    pub id: RecordId,
    pub title: PieceLine,
    pub msg_count: u32,
    pub href: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub query: String,
    pub mode: SearchMode,
    /// Every row in display order, hidden ones included
    pub rows: Vec<Row>,
    pub no_results: bool,
    /// Index into the visible rows
    pub selected: usize,
}

impl ListPage {
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.visible_rows().nth(self.selected)
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }
}

/// A logical line of the detail body before wrapping
#[derive(Debug, Clone)]
pub enum BodyLine {
    /// "Message i of n" heading of a block
    Heading { speaker: Speaker, ordinal: usize, total: u32 },
    Text(PieceLine),
    Blank,
}

/// A wrapped line ready to draw
#[derive(Debug, Clone)]
pub enum VisualLine {
    Heading(String, Speaker),
    Text(PieceLine),
    Blank,
}

#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    pub title: String,
    pub meta: String,
    body: Vec<BodyLine>,
    /// Body wrapped at the screen's body width
    pub lines: Vec<VisualLine>,
    pub span_count: usize,
    pub current: Option<SpanId>,
    pub scroll: usize,
    pub next_label: Option<String>,
    pub floating_nav: bool,
}

impl DetailPage {
    fn relayout(&mut self, width: usize) {
        self.lines.clear();

        for line in &self.body {
            match line {
                BodyLine::Heading { speaker, ordinal, total } => {
                    let who = match speaker {
                        Speaker::Prompt => "Prompt",
                        Speaker::Response => "Response",
                        Speaker::Plain => "Transcript",
                    };
                    self.lines.push(VisualLine::Heading(
                        format!("{who} · Message {ordinal} of {total}"),
                        *speaker,
                    ));
                }
                BodyLine::Text(pieces) => {
                    self.lines
                        .extend(wrap(pieces, width).into_iter().map(VisualLine::Text));
                }
                BodyLine::Blank => self.lines.push(VisualLine::Blank),
            }
        }
    }

    /// First visual line holding a span
    pub fn line_of(&self, span: SpanId) -> Option<usize> {
        self.lines.iter().position(|line| match line {
            VisualLine::Text(pieces) => pieces.iter().any(|p| p.span == Some(span)),
            _ => false,
        })
    }

    pub fn max_scroll(&self, viewport: usize) -> usize {
        self.lines.len().saturating_sub(viewport.max(1))
    }
}

/// What the screen is showing
#[derive(Debug, Clone, Default)]
pub enum Page {
    #[default]
    Loading,
    List(ListPage),
    Detail(DetailPage),
    Fatal(String),
}

/// Terminal rendition of the engine's surface: everything drawn comes from
/// render instructions and the in-place updates that follow them.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    pub location: String,
    pub page: Page,
    /// Body area size, refreshed before every draw
    pub body_width: usize,
    pub body_height: usize,
}

impl Screen {
    /// Keep the body layout in step with the terminal size
    pub fn resize(&mut self, width: usize, height: usize) {
        self.body_height = height;
        if width == self.body_width {
            return;
        }
        self.body_width = width;

        let current = self.detail_mut().and_then(|detail| {
            detail.relayout(width);
            detail.current
        });
        // Line numbers moved; keep the selected highlight in view
        if let Some(span) = current {
            self.scroll_to_center(span);
        }
    }

    fn list_mut(&mut self) -> Option<&mut ListPage> {
        match &mut self.page {
            Page::List(list) => Some(list),
            _ => None,
        }
    }

    fn detail_mut(&mut self) -> Option<&mut DetailPage> {
        match &mut self.page {
            Page::Detail(detail) => Some(detail),
            _ => None,
        }
    }

    /// Current scroll offset of the detail body
    pub fn detail_scroll(&self) -> Option<usize> {
        match &self.page {
            Page::Detail(detail) => Some(detail.scroll),
            _ => None,
        }
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let viewport = self.body_height;
        if let Some(detail) = self.detail_mut() {
            let max = detail.max_scroll(viewport);
            detail.scroll = detail.scroll.saturating_add_signed(delta).min(max);
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        let viewport = self.body_height;
        if let Some(detail) = self.detail_mut() {
            detail.scroll = detail.max_scroll(viewport);
        }
    }

    pub fn select_by(&mut self, delta: isize) {
        if let Some(list) = self.list_mut() {
            let count = list.visible_count();
            if count == 0 {
                return;
            }
            list.selected = list.selected.saturating_add_signed(delta).min(count - 1);
        }
    }

    pub fn select_first(&mut self) {
        if let Some(list) = self.list_mut() {
            list.selected = 0;
        }
    }

    pub fn select_last(&mut self) {
        if let Some(list) = self.list_mut() {
            list.selected = list.visible_count().saturating_sub(1);
        }
    }
}

fn list_page(query: &str, mode: SearchMode, rows: &[ListRow], no_results: bool) -> ListPage {
    ListPage {
        query: query.to_string(),
        mode,
        rows: rows
            .iter()
            .map(|row| Row {
                id: row.id,
                title: decode_line(&row.title_html),
                msg_count: row.msg_count,
                href: row.href.clone(),
                visible: row.visible,
            })
            .collect(),
        no_results,
        selected: 0,
    }
}

impl Surface for Screen {
    fn paint(&mut self, instruction: &RenderInstruction) {
        self.page = match instruction {
            RenderInstruction::List { query, mode, rows, no_results } => {
                Page::List(list_page(query, *mode, rows, *no_results))
            }
            RenderInstruction::Detail { header, messages, span_count, .. } => {
                let mut body = Vec::new();
                for message in messages {
                    body.push(BodyLine::Heading {
                        speaker: message.speaker,
                        ordinal: message.ordinal,
                        total: message.total,
                    });
                    body.extend(decode(&message.html).into_iter().map(BodyLine::Text));
                    body.push(BodyLine::Blank);
                }

                let mut detail = DetailPage {
                    title: plain_text(&decode_line(&header.title_html)),
                    meta: format!(
                        "#{} · {} messages · {} bytes",
                        header.id, header.msg_count, header.filesize_display
                    ),
                    body,
                    span_count: *span_count,
                    ..DetailPage::default()
                };
                detail.relayout(self.body_width);
                Page::Detail(detail)
            }
            RenderInstruction::Fatal { error } => Page::Fatal(error.clone()),
        };
    }

    fn set_location(&mut self, fragment: &str) {
        self.location = fragment.to_string();
    }
}

impl ListSurface for Screen {
    fn set_query_input(&mut self, text: &str) {
        if let Some(list) = self.list_mut() {
            list.query = text.to_string();
        }
    }

    fn set_mode_toggle(&mut self, mode: SearchMode) {
        if let Some(list) = self.list_mut() {
            list.mode = mode;
        }
    }

    fn update_row(&mut self, id: RecordId, visible: bool, title_html: &str, href: &str) {
        if let Some(list) = self.list_mut() {
            if let Some(row) = list.rows.iter_mut().find(|r| r.id == id) {
                row.visible = visible;
                row.title = decode_line(title_html);
                row.href = href.to_string();
            }
            list.clamp_selection();
        }
    }

    fn set_no_results(&mut self, shown: bool) {
        if let Some(list) = self.list_mut() {
            list.no_results = shown;
        }
    }
}

impl HighlightSurface for Screen {
    fn set_current(&mut self, span: SpanId, current: bool) {
        if let Some(detail) = self.detail_mut() {
            if current {
                detail.current = Some(span);
            } else if detail.current == Some(span) {
                detail.current = None;
            }
        }
    }

    fn scroll_to_center(&mut self, span: SpanId) {
        let viewport = self.body_height;
        if let Some(detail) = self.detail_mut() {
            if let Some(line) = detail.line_of(span) {
                detail.scroll = line.saturating_sub(viewport / 2).min(detail.max_scroll(viewport));
            }
        }
    }
}

impl DetailSurface for Screen {
    fn set_next_control(&mut self, label: Option<&str>) {
        if let Some(detail) = self.detail_mut() {
            detail.next_label = label.map(str::to_string);
        }
    }

    fn set_floating_nav(&mut self, visible: bool) {
        if let Some(detail) = self.detail_mut() {
            detail.floating_nav = visible;
        }
    }

    fn scroll_to_top(&mut self) {
        if let Some(detail) = self.detail_mut() {
            detail.scroll = 0;
        }
    }
}

/// Keyboard focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    /// Keys go to the active view
    View,
    /// Editing the location bar
    Location(String),
    Help,
}

/// Application state
pub struct App<'s> {
    /// `None` once the archive failed to load
    session: Option<Session<'s>>,
    pub screen: Screen,
    pub focus: Focus,
    pub status_message: String,
    pub should_quit: bool,
    /// Last scroll offset reported to the session
    reported_scroll: Option<usize>,
}

impl<'s> App<'s> {
    pub fn new(mut session: Session<'s>) -> Self {
        let mut screen = Screen::default();
        session.show(&mut screen);
        let status_message = format!("{} conversations", session.store().len());

        Self {
            session: Some(session),
            screen,
            focus: Focus::View,
            status_message,
            should_quit: false,
            reported_scroll: Some(0),
        }
    }

    /// App showing only the fatal load error
    pub fn failed(error: &LoadError) -> Self {
        let mut screen = Screen::default();
        screen.paint(&RenderInstruction::fatal(error));

        Self {
            session: None,
            screen,
            focus: Focus::View,
            status_message: "Archive failed to load".to_string(),
            should_quit: false,
            reported_scroll: None,
        }
    }

    pub fn next_key(&self) -> char {
        self.session.as_ref().map_or('n', |s| s.options().next_key)
    }

    /// Forward an event to the session, then report any scroll it caused
    pub fn dispatch(&mut self, event: UiEvent) {
        if let Some(session) = self.session.as_mut() {
            session.handle(event, &mut self.screen);
        }
        self.report_scroll();
    }

    /// Tell the session where the detail body is scrolled to, like a
    /// browser's scroll event
    pub fn report_scroll(&mut self) {
        let scroll = self.screen.detail_scroll();
        if scroll == self.reported_scroll {
            return;
        }
        self.reported_scroll = scroll;
        if let (Some(offset), Some(session)) = (scroll, self.session.as_mut()) {
            session.handle(UiEvent::Scrolled(offset as u32), &mut self.screen);
        }
    }

    /// Edit the query input in place, then report its new value like an
    /// `input` event
    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(list) = self.screen.list_mut() else {
            return;
        };
        edit(&mut list.query);
        let text = list.query.clone();
        self.dispatch(UiEvent::QueryInput(text));
    }

    pub fn type_char(&mut self, c: char) {
        self.edit_query(|query| query.push(c));
    }

    pub fn backspace(&mut self) {
        self.edit_query(|query| {
            query.pop();
        });
    }

    pub fn delete_word(&mut self) {
        self.edit_query(|query| {
            let trimmed = query.trim_end();
            let cut = trimmed
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_whitespace())
                .map_or(0, |(i, c)| i + c.len_utf8());
            query.truncate(cut);
        });
    }

    pub fn clear_query(&mut self) {
        self.edit_query(String::clear);
    }

    pub fn query_is_empty(&self) -> bool {
        match &self.screen.page {
            Page::List(list) => list.query.is_empty(),
            _ => true,
        }
    }

    pub fn open_selected(&mut self) {
        let selected = match &self.screen.page {
            Page::List(list) => list.selected_row().map(|r| r.id),
            _ => None,
        };
        if let Some(id) = selected {
            self.dispatch(UiEvent::RowActivated(id));
        }
    }

    pub fn scroll(&mut self, delta: isize) {
        self.screen.scroll_by(delta);
        self.report_scroll();
    }

    pub fn page_down(&mut self) {
        self.scroll(PAGE_LINES as isize);
    }

    pub fn page_up(&mut self) {
        self.scroll(-(PAGE_LINES as isize));
    }

    pub fn half_page_down(&mut self) {
        self.scroll(HALF_PAGE_LINES as isize);
    }

    pub fn half_page_up(&mut self) {
        self.scroll(-(HALF_PAGE_LINES as isize));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.screen.scroll_to_bottom();
        self.report_scroll();
    }

    /// History back; leaves the app at the first entry
    pub fn go_back(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if !session.go_back(&mut self.screen) {
                self.status_message = "Already at the first location".to_string();
            }
        }
        self.reported_scroll = self.screen.detail_scroll();
    }

    pub fn start_location_edit(&mut self) {
        self.focus = Focus::Location(self.screen.location.clone());
    }

    pub fn location_input(&mut self) -> Option<&mut String> {
        match &mut self.focus {
            Focus::Location(text) => Some(text),
            _ => None,
        }
    }

    /// Jump to the fragment typed into the location bar
    pub fn commit_location(&mut self) {
        let Focus::Location(fragment) = std::mem::replace(&mut self.focus, Focus::View) else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.location_changed(&fragment, &mut self.screen);
            tracing::debug!(fragment = %fragment, resolved = %session.location(), "location entered");
        }
        self.reported_scroll = self.screen.detail_scroll();
    }

    pub fn cancel_location_edit(&mut self) {
        self.focus = Focus::View;
    }

    pub fn show_help(&mut self) {
        self.focus = Focus::Help;
    }

    pub fn hide_help(&mut self) {
        self.focus = Focus::View;
    }
}
