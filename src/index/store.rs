use crate::index::error::LoadError;
use crate::index::types::*;
use memmap2::Mmap;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Read-only handle over a loaded archive.
///
/// Built exactly once at startup from the three archive documents and then
/// borrowed by every other component for the lifetime of the session. There
/// are no mutation operations.
#[derive(Debug)]
pub struct StoreHandle {
    /// Records sorted by ascending id
    records: Vec<Record>,
    /// Record id -> position in `records`
    positions: FxHashMap<RecordId, usize>,
    /// Every known record id
    universe: RoaringBitmap,
    /// Token -> postings
    tokens: FxHashMap<String, RoaringBitmap>,
    /// Full-text blobs sorted by ascending id
    full_text: Vec<(RecordId, String)>,
    /// Directory the archive was opened from, if any
    source_dir: Option<PathBuf>,
}

impl StoreHandle {
    /// Build a store from the raw bytes of the three archive documents
    pub fn load(records: &[u8], token_index: &[u8], full_text: &[u8]) -> Result<Self, LoadError> {
        let records = parse_records(records)?;
        let tokens = parse_token_index(token_index)?;
        let full_text = parse_full_text(full_text)?;

        let positions = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id, pos))
            .collect();
        let universe = records.iter().map(|r| r.id).collect();

        Ok(Self {
            records,
            positions,
            universe,
            tokens,
            full_text,
            source_dir: None,
        })
    }

    /// Open an archive directory, reading all three documents concurrently.
    ///
    /// Nothing is parsed until every read has finished, and any single
    /// failure fails the whole load.
    pub fn open(dir: &Path) -> Result<Self, LoadError> {
        let start = Instant::now();

        let (records, (tokens, full_text)) = rayon::join(
            || map_document(dir, ArchiveDocument::Records),
            || {
                rayon::join(
                    || map_document(dir, ArchiveDocument::TokenIndex),
                    || map_document(dir, ArchiveDocument::FullText),
                )
            },
        );
        let (records, tokens, full_text) = (records?, tokens?, full_text?);

        let mut store = Self::load(&records, &tokens, &full_text)?;
        store.source_dir = Some(dir.to_path_buf());

        tracing::info!(
            dir = %dir.display(),
            records = store.len(),
            tokens = store.token_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "archive loaded"
        );

        Ok(store)
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.positions.get(&id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.universe.contains(id)
    }

    /// The id universe: every record id known to the store
    pub fn ids(&self) -> &RoaringBitmap {
        &self.universe
    }

    /// All records in ascending id order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Postings for a token, or `None` if the token was never indexed
    pub fn postings(&self, token: &str) -> Option<&RoaringBitmap> {
        self.tokens.get(token)
    }

    /// Iterate over every (token, postings) pair, in no particular order
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &RoaringBitmap)> {
        self.tokens.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn full_text(&self, id: RecordId) -> Option<&str> {
        self.full_text
            .binary_search_by_key(&id, |(rid, _)| *rid)
            .ok()
            .map(|i| self.full_text[i].1.as_str())
    }

    /// Iterate over every full-text blob in ascending id order
    pub fn full_text_entries(&self) -> impl Iterator<Item = (RecordId, &str)> {
        self.full_text.iter().map(|(id, blob)| (*id, blob.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }
}

fn map_document(dir: &Path, document: ArchiveDocument) -> Result<Mmap, LoadError> {
    let path = dir.join(document.file_name());
    let fetch_err = |source| LoadError::Fetch {
        document,
        path: path.clone(),
        source,
    };

    let file = File::open(&path).map_err(fetch_err)?;
    // SAFETY: archive documents are immutable for the lifetime of the session
    let mmap = unsafe { Mmap::map(&file) }.map_err(fetch_err)?;

    tracing::debug!(path = %path.display(), bytes = mmap.len(), "mapped archive document");
    Ok(mmap)
}

fn parse_document<T: DeserializeOwned>(document: ArchiveDocument, bytes: &[u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Parse { document, source })
}

fn parse_key(document: ArchiveDocument, key: &str) -> Result<RecordId, LoadError> {
    key.trim()
        .parse()
        .map_err(|_| LoadError::malformed(document, format!("key {key:?} is not a record id")))
}

fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, LoadError> {
    let document = ArchiveDocument::Records;
    let table: FxHashMap<String, Record> = parse_document(document, bytes)?;

    let mut records = Vec::with_capacity(table.len());
    for (key, record) in table {
        let id = parse_key(document, &key)?;
        if id != record.id {
            return Err(LoadError::malformed(
                document,
                format!("key {key:?} holds record with id {}", record.id),
            ));
        }
        records.push(record);
    }

    records.sort_unstable_by_key(|r| r.id);
    Ok(records)
}

fn parse_token_index(bytes: &[u8]) -> Result<FxHashMap<String, RoaringBitmap>, LoadError> {
    let raw: FxHashMap<String, Vec<RecordId>> = parse_document(ArchiveDocument::TokenIndex, bytes)?;

    Ok(raw
        .into_iter()
        .map(|(token, ids)| (token, ids.into_iter().collect()))
        .collect())
}

fn parse_full_text(bytes: &[u8]) -> Result<Vec<(RecordId, String)>, LoadError> {
    let document = ArchiveDocument::FullText;
    let raw: FxHashMap<String, String> = parse_document(document, bytes)?;

    let mut entries = raw
        .into_iter()
        .map(|(key, blob)| Ok((parse_key(document, &key)?, blob)))
        .collect::<Result<Vec<_>, LoadError>>()?;

    entries.sort_unstable_by_key(|(id, _)| *id);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = r###"{
        "1": {"id": 1, "title": "Rust proxy", "msg_count": 4, "filesize": 120, "content": "## PROMPT ##\nhi"},
        "2": {"id": 2, "title": "Go", "msg_count": 2, "filesize": 80, "content": "## PROMPT ##\nyo"}
    }"###;
    const TOKENS: &str = r#"{"rust": [1], "proxy": [1, 2]}"#;
    const FULL_TEXT: &str = r#"{"1": "rust proxy\nhi", "2": "go\nyo"}"#;

    fn store() -> StoreHandle {
        StoreHandle::load(RECORDS.as_bytes(), TOKENS.as_bytes(), FULL_TEXT.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_valid_archive() {
        let store = store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.token_count(), 2);
        assert_eq!(store.get(1).unwrap().title, "Rust proxy");
        assert!(store.contains(2));
        assert!(!store.contains(3));
        assert_eq!(store.full_text(2), Some("go\nyo"));
        assert_eq!(store.postings("proxy").unwrap().len(), 2);
        assert!(store.postings("absent").is_none());
    }

    #[test]
    fn test_records_sorted_by_id() {
        let ids: Vec<_> = store().records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_rejects_non_mapping() {
        let err = StoreHandle::load(b"[1, 2]", TOKENS.as_bytes(), FULL_TEXT.as_bytes()).unwrap_err();
        assert_eq!(err.document(), ArchiveDocument::Records);
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_rejects_missing_field() {
        let records = r#"{"1": {"id": 1, "title": "no content", "msg_count": 1, "filesize": 3}}"#;
        let err = StoreHandle::load(records.as_bytes(), TOKENS.as_bytes(), FULL_TEXT.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_rejects_mismatched_key() {
        let records = r#"{"7": {"id": 1, "title": "t", "msg_count": 1, "filesize": 3, "content": ""}}"#;
        let err = StoreHandle::load(records.as_bytes(), TOKENS.as_bytes(), FULL_TEXT.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { document: ArchiveDocument::Records, .. }));
    }

    #[test]
    fn test_rejects_bad_full_text_key() {
        let err = StoreHandle::load(RECORDS.as_bytes(), TOKENS.as_bytes(), br#"{"one": "x"}"#).unwrap_err();
        assert_eq!(err.document(), ArchiveDocument::FullText);
    }

    #[test]
    fn test_rejects_malformed_postings() {
        let err = StoreHandle::load(RECORDS.as_bytes(), br#"{"rust": "1"}"#, FULL_TEXT.as_bytes()).unwrap_err();
        assert_eq!(err.document(), ArchiveDocument::TokenIndex);
    }

    #[test]
    fn test_open_missing_directory_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreHandle::open(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }

    #[test]
    fn test_open_reads_all_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RECORDS_FILE), RECORDS).unwrap();
        std::fs::write(dir.path().join(TOKEN_INDEX_FILE), TOKENS).unwrap();
        std::fs::write(dir.path().join(FULL_TEXT_FILE), FULL_TEXT).unwrap();

        let store = StoreHandle::open(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.source_dir(), Some(dir.path()));
    }
}
