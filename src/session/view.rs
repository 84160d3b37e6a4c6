use crate::highlight::{highlight_title, escape_html, render_content, HighlightCursor, RenderedContent, Speaker};
use crate::index::error::LoadError;
use crate::index::store::StoreHandle;
use crate::index::types::{display_order, Record, RecordId};
use crate::query::{normalize_query, MatchSet, QueryEvaluator, QueryState, SearchMode};
use crate::router::Location;
use crate::utils::format_thousands;
use serde::Serialize;

/// What the presentation layer should paint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum RenderInstruction {
    List {
        query: String,
        mode: SearchMode,
        rows: Vec<ListRow>,
        no_results: bool,
    },
    Detail {
        header: DetailHeader,
        query: Option<String>,
        messages: Vec<MessageView>,
        span_count: usize,
    },
    /// Terminal state after a failed load
    Fatal { error: String },
}

impl RenderInstruction {
    pub fn fatal(err: &LoadError) -> Self {
        RenderInstruction::Fatal {
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: RecordId,
    pub title_html: String,
    pub msg_count: u32,
    pub href: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailHeader {
    pub id: RecordId,
    pub title_html: String,
    pub msg_count: u32,
    pub filesize: u64,
    pub filesize_display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub speaker: Speaker,
    pub ordinal: usize,
    /// The record's declared message count, for "Message i of n"
    pub total: u32,
    pub html: String,
}

/// State of the list view
#[derive(Debug)]
pub struct ListView<'s> {
    /// Every record, in display order
    rows: Vec<&'s Record>,
    query: QueryState,
    matched: MatchSet,
}

impl<'s> ListView<'s> {
    pub fn new(store: &'s StoreHandle, query: QueryState) -> Self {
        let mut rows: Vec<&Record> = store.records().iter().collect();
        rows.sort_by(|a, b| display_order(a, b));

        let matched = QueryEvaluator::new(store).evaluate_state(&query);
        Self { rows, query, matched }
    }

    /// Re-evaluate after the query text or mode changed
    pub fn update(&mut self, store: &StoreHandle, query: QueryState) {
        self.matched = QueryEvaluator::new(store).evaluate_state(&query);
        self.query = query;
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn matched(&self) -> &MatchSet {
        &self.matched
    }

    pub fn rows(&self) -> &[&'s Record] {
        &self.rows
    }

    pub fn is_visible(&self, id: RecordId) -> bool {
        self.matched.contains(id)
    }

    /// Matching records, in display order
    pub fn visible_rows(&self) -> impl Iterator<Item = &'s Record> + '_ {
        self.rows.iter().copied().filter(|r| self.matched.contains(r.id))
    }

    /// The "no results" indicator shows only for a non-empty query
    pub fn no_results(&self) -> bool {
        self.matched.is_empty() && !normalize_query(&self.query.text).is_empty()
    }

    /// Title markup for a row; hidden rows are never highlighted
    pub fn title_html(&self, record: &Record) -> String {
        if self.is_visible(record.id) {
            highlight_title(&record.title, &normalize_query(&self.query.text))
        } else {
            escape_html(&record.title)
        }
    }

    /// Fragment a row links to, carrying the query as typed
    pub fn href(&self, id: RecordId) -> String {
        Location::detail(id, Some(self.query.text.clone())).to_fragment()
    }

    pub fn instruction(&self) -> RenderInstruction {
        RenderInstruction::List {
            query: self.query.text.clone(),
            mode: self.query.mode,
            rows: self
                .rows
                .iter()
                .map(|record| ListRow {
                    id: record.id,
                    title_html: self.title_html(record),
                    msg_count: record.msg_count,
                    href: self.href(record.id),
                    visible: self.is_visible(record.id),
                })
                .collect(),
            no_results: self.no_results(),
        }
    }
}

/// State of the detail view
#[derive(Debug)]
pub struct DetailView<'s> {
    record: &'s Record,
    query: Option<String>,
    content: RenderedContent<'s>,
    pub(crate) cursor: HighlightCursor,
    pub(crate) nav_visible: bool,
}

impl<'s> DetailView<'s> {
    pub fn new(record: &'s Record, query: Option<String>) -> Self {
        let content = render_content(&record.content, query.as_deref());
        let cursor = HighlightCursor::new(content.spans());
        Self {
            record,
            query,
            content,
            cursor,
            nav_visible: false,
        }
    }

    pub fn record(&self) -> &'s Record {
        self.record
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn content(&self) -> &RenderedContent<'s> {
        &self.content
    }

    pub fn cursor(&self) -> &HighlightCursor {
        &self.cursor
    }

    pub fn nav_visible(&self) -> bool {
        self.nav_visible
    }

    /// Label of the "next occurrence" control, e.g. `Next (2/5)`
    pub fn next_label(&self) -> Option<String> {
        if self.cursor.is_empty() {
            return None;
        }
        Some(match self.cursor.label() {
            Some(position) => format!("Next ({position})"),
            None => "Next".to_string(),
        })
    }

    pub fn instruction(&self) -> RenderInstruction {
        RenderInstruction::Detail {
            header: DetailHeader {
                id: self.record.id,
                title_html: escape_html(&self.record.title),
                msg_count: self.record.msg_count,
                filesize: self.record.filesize,
                filesize_display: format_thousands(self.record.filesize),
            },
            query: self.query.clone(),
            messages: self
                .content
                .blocks
                .iter()
                .map(|block| MessageView {
                    speaker: block.speaker,
                    ordinal: block.ordinal,
                    total: self.record.msg_count,
                    html: block.to_html(),
                })
                .collect(),
            span_count: self.content.span_count,
        }
    }
}

/// The view currently on screen
#[derive(Debug)]
pub enum ActiveView<'s> {
    List(ListView<'s>),
    Detail(DetailView<'s>),
}

impl ActiveView<'_> {
    pub fn instruction(&self) -> RenderInstruction {
        match self {
            ActiveView::List(list) => list.instruction(),
            ActiveView::Detail(detail) => detail.instruction(),
        }
    }
}
