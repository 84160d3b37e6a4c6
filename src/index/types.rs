use serde::{Deserialize, Serialize};

/// Unique identifier for a conversation record (dense, starting at 1)
pub type RecordId = u32;

/// File name of the record table inside an archive directory
pub const RECORDS_FILE: &str = "database.json";

/// File name of the token postings index
pub const TOKEN_INDEX_FILE: &str = "search_index_word.json";

/// File name of the full-text index
pub const FULL_TEXT_FILE: &str = "search_index_full_text.json";

/// Marker opening a user prompt inside record content
pub const PROMPT_MARKER: &str = "## PROMPT ##";

/// Marker opening a model response inside record content
pub const RESPONSE_MARKER: &str = "## RESPONSE ##";

/// Shortest token that is ever stored in the token index
pub const MIN_TOKEN_LEN: usize = 2;

/// A single archived conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub msg_count: u32,
    pub filesize: u64,
    pub content: String,
}

/// Which of the three archive documents a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveDocument {
    Records,
    TokenIndex,
    FullText,
}

impl ArchiveDocument {
    pub const ALL: [ArchiveDocument; 3] = [
        ArchiveDocument::Records,
        ArchiveDocument::TokenIndex,
        ArchiveDocument::FullText,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArchiveDocument::Records => RECORDS_FILE,
            ArchiveDocument::TokenIndex => TOKEN_INDEX_FILE,
            ArchiveDocument::FullText => FULL_TEXT_FILE,
        }
    }
}

impl std::fmt::Display for ArchiveDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Compare two records for list display: most messages first, ties by id
#[inline]
pub fn display_order(a: &Record, b: &Record) -> std::cmp::Ordering {
    b.msg_count.cmp(&a.msg_count).then(a.id.cmp(&b.id))
}
