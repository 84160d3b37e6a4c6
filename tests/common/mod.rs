//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use arcview::highlight::{HighlightSurface, SpanId};
use arcview::index::{RecordId, StoreHandle};
use arcview::query::SearchMode;
use arcview::session::{DetailSurface, ListSurface, RenderInstruction, Surface};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Directory of sample chat transcripts
pub fn chats_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("chats")
}

/// Build a store from inline archive documents
pub fn store(records: &str, tokens: &str, full_text: &str) -> StoreHandle {
    StoreHandle::load(records.as_bytes(), tokens.as_bytes(), full_text.as_bytes())
        .expect("fixture archive should load")
}

/// Three conversations with distinct message counts and searchable content
pub fn sample_store() -> StoreHandle {
    store(
        r###"{
            "1": {"id": 1, "title": "Rust proxy", "msg_count": 5, "filesize": 1500,
                  "content": "## PROMPT ##\nHow do I build a caching proxy?\n## RESPONSE ##\nCaching proxies keep <hot> data & serve it fast. Caching!"},
            "2": {"id": 2, "title": "Go channels", "msg_count": 2, "filesize": 300,
                  "content": "## PROMPT ##\nExplain channels\n## RESPONSE ##\nThey pass values."},
            "3": {"id": 3, "title": "Rust lifetimes", "msg_count": 8, "filesize": 4200,
                  "content": "## PROMPT ##\nWhat is a lifetime?\n## RESPONSE ##\nA region of code."}
        }"###,
        r#"{
            "rust": [1, 3], "proxy": [1, 2], "caching": [1], "go": [2],
            "channels": [2], "lifetimes": [3], "lifetime": [3]
        }"#,
        r#"{
            "1": "rust proxy\nhow do i build a caching proxy?\ncaching proxies keep <hot> data & serve it fast. caching!",
            "2": "go channels\nexplain channels\nthey pass values.",
            "3": "rust lifetimes\nwhat is a lifetime?\na region of code."
        }"#,
    )
}

/// Surface that records everything the engine asks of it
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub painted: Vec<RenderInstruction>,
    pub location: String,
    pub query_input: String,
    pub mode: SearchMode,
    /// Row id -> (visible, title markup, href)
    pub rows: BTreeMap<RecordId, (bool, String, String)>,
    pub no_results: bool,
    pub current: Vec<SpanId>,
    pub scrolled_to: Vec<SpanId>,
    pub next_control: Option<String>,
    pub floating_nav: bool,
    pub scrolled_to_top: usize,
}

impl RecordingSurface {
    pub fn last_paint(&self) -> &RenderInstruction {
        self.painted.last().expect("nothing painted yet")
    }

    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .filter(|(_, (visible, _, _))| *visible)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn paint(&mut self, instruction: &RenderInstruction) {
        self.rows.clear();
        self.current.clear();
        self.next_control = None;
        self.painted.push(instruction.clone());
    }

    fn set_location(&mut self, fragment: &str) {
        self.location = fragment.to_string();
    }
}

impl ListSurface for RecordingSurface {
    fn set_query_input(&mut self, text: &str) {
        self.query_input = text.to_string();
    }

    fn set_mode_toggle(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    fn update_row(&mut self, id: RecordId, visible: bool, title_html: &str, href: &str) {
        self.rows
            .insert(id, (visible, title_html.to_string(), href.to_string()));
    }

    fn set_no_results(&mut self, shown: bool) {
        self.no_results = shown;
    }
}

impl HighlightSurface for RecordingSurface {
    fn set_current(&mut self, span: SpanId, current: bool) {
        if current {
            self.current.push(span);
        } else {
            self.current.retain(|s| *s != span);
        }
    }

    fn scroll_to_center(&mut self, span: SpanId) {
        self.scrolled_to.push(span);
    }
}

impl DetailSurface for RecordingSurface {
    fn set_next_control(&mut self, label: Option<&str>) {
        self.next_control = label.map(str::to_string);
    }

    fn set_floating_nav(&mut self, visible: bool) {
        self.floating_nav = visible;
    }

    fn scroll_to_top(&mut self) {
        self.scrolled_to_top += 1;
    }
}
