use crate::index::store::StoreHandle;
use crate::index::types::{display_order, Record};
use crate::utils::{format_size, format_thousands};
use anyhow::Result;

const TOP_N: usize = 10;

/// Aggregate numbers about a loaded archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
    pub records: usize,
    pub messages: u64,
    pub bytes: u64,
    pub tokens: usize,
}

impl ArchiveStats {
    pub fn collect(store: &StoreHandle) -> Self {
        Self {
            records: store.len(),
            messages: store.records().iter().map(|r| u64::from(r.msg_count)).sum(),
            bytes: store.records().iter().map(|r| r.filesize).sum(),
            tokens: store.token_count(),
        }
    }
}

/// Largest conversations, in list display order
pub fn largest_records(store: &StoreHandle, n: usize) -> Vec<&Record> {
    let mut records: Vec<&Record> = store.records().iter().collect();
    records.sort_by(|a, b| display_order(a, b));
    records.truncate(n);
    records
}

/// Tokens appearing in the most conversations, ties alphabetical
pub fn frequent_tokens(store: &StoreHandle, n: usize) -> Vec<(&str, u64)> {
    let mut tokens: Vec<(&str, u64)> = store.tokens().map(|(t, p)| (t, p.len())).collect();
    tokens.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    tokens.truncate(n);
    tokens
}

/// Display archive statistics
pub fn show_stats(store: &StoreHandle) -> Result<()> {
    let stats = ArchiveStats::collect(store);

    println!("Archive Statistics");
    println!("==================");
    println!();
    if let Some(dir) = store.source_dir() {
        println!("Archive location: {}", dir.display());
    }
    println!("Conversations:    {}", format_thousands(stats.records as u64));
    println!("Messages:         {}", format_thousands(stats.messages));
    println!("Distinct tokens:  {}", format_thousands(stats.tokens as u64));
    println!("Content size:     {}", format_size(stats.bytes));

    let largest = largest_records(store, TOP_N);
    if !largest.is_empty() {
        println!();
        println!("Longest conversations:");
        for record in largest {
            println!("  {:>6}  {:>5} msgs  {}", record.id, record.msg_count, record.title);
        }
    }

    let frequent = frequent_tokens(store, TOP_N);
    if !frequent.is_empty() {
        println!();
        println!("Most common tokens:");
        for (token, count) in frequent {
            println!("  {:20} {}", token, count);
        }
    }

    if store.len() > TOP_N {
        println!();
        println!("  ... and {} more conversations", store.len() - TOP_N);
    }

    Ok(())
}
