use crate::index::types::*;
use crate::utils::extract_tokens;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name patterns picked up when none are given
pub const DEFAULT_PATTERNS: &[&str] = &["*.txt", "*.md"];

/// Options for one archive build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Glob patterns matched against each file name
    pub patterns: Vec<String>,
    /// Suppress progress output
    pub silent: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            silent: false,
        }
    }
}

/// What a build wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub records: usize,
    pub tokens: usize,
    pub skipped: usize,
    pub out_dir: PathBuf,
}

/// A chat file as read from disk
struct RawChat {
    /// Text with invalid UTF-8 replaced
    content: String,
    /// Size of the file on disk
    filesize: u64,
}

/// A chat file after the parallel processing phase
struct ProcessedChat {
    record: Record,
    full_text: String,
    tokens: Vec<String>,
}

/// Build the three archive documents from a directory of chat text files
pub fn build_archive(src: &Path, out: &Path, options: &BuildOptions) -> Result<BuildSummary> {
    let root = src.canonicalize().context("Invalid source path")?;
    let globs = compile_patterns(&options.patterns)?;

    if !options.silent {
        println!("Building archive from: {}", root.display());
    }

    let spinner = if !options.silent {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("Invalid progress template")?,
        );
        spinner.set_message("Discovering chats...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Some(spinner)
    } else {
        None
    };

    let files = discover_files(&root, &globs);

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Found {} chats", files.len()));
    }

    let progress_bar = if !options.silent {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress template")?
                .progress_chars("█▓▒░  "),
        );
        pb.set_message("Reading chats...");
        Some(pb)
    } else {
        None
    };

    // Order is preserved by the parallel collect, so ids follow path order
    let contents: Vec<Option<RawChat>> = files
        .par_iter()
        .map(|path| {
            let content = match fs::read(path) {
                Ok(bytes) => Some(RawChat {
                    filesize: bytes.len() as u64,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable chat");
                    None
                }
            };
            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
            content
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Read chats");
    }

    let readable: Vec<(&PathBuf, RawChat)> = files
        .iter()
        .zip(contents)
        .filter_map(|(path, content)| content.map(|c| (path, c)))
        .collect();
    let skipped = files.len() - readable.len();

    let chats: Vec<ProcessedChat> = readable
        .into_par_iter()
        .enumerate()
        .map(|(i, (path, raw))| process_chat(i as RecordId + 1, path, raw))
        .collect();

    let token_count = write_archive(out, &chats)?;

    let summary = BuildSummary {
        records: chats.len(),
        tokens: token_count,
        skipped,
        out_dir: out.to_path_buf(),
    };

    tracing::info!(
        records = summary.records,
        tokens = summary.tokens,
        skipped = summary.skipped,
        out = %out.display(),
        "archive built"
    );

    if !options.silent {
        println!("Archive written to: {}", out.display());
        println!("  {} records, {} tokens", summary.records, summary.tokens);
        if skipped > 0 {
            eprintln!("({} files could not be read)", skipped);
        }
    }

    Ok(summary)
}

fn compile_patterns(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid pattern {pattern:?}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to compile patterns")
}

/// Matching chat files under `root`, sorted by path
fn discover_files(root: &Path, globs: &GlobSet) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| globs.is_match(entry.file_name()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

fn process_chat(id: RecordId, path: &Path, raw: RawChat) -> ProcessedChat {
    let RawChat { content, filesize } = raw;
    let title = title_from_path(path);

    let mut full_text = String::with_capacity(title.len() + 1 + content.len());
    full_text.push_str(&title);
    full_text.push('\n');
    full_text.push_str(&content);

    let tokens = extract_tokens(&full_text).into_iter().collect();

    ProcessedChat {
        record: Record {
            id,
            msg_count: count_messages(&content),
            filesize,
            title,
            content,
        },
        full_text: full_text.to_lowercase(),
        tokens,
    }
}

/// Display title from a chat file name: `rust_proxy-notes.txt` -> `rust proxy notes`
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let title = stem.replace(['_', '-'], " ");
    let title = title.trim();

    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title.to_string()
    }
}

/// Number of speaker markers in a chat body
pub fn count_messages(content: &str) -> u32 {
    (content.matches(PROMPT_MARKER).count() + content.matches(RESPONSE_MARKER).count()) as u32
}

fn write_archive(out: &Path, chats: &[ProcessedChat]) -> Result<usize> {
    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    let records: BTreeMap<RecordId, &Record> =
        chats.iter().map(|c| (c.record.id, &c.record)).collect();
    let full_text: BTreeMap<RecordId, &str> =
        chats.iter().map(|c| (c.record.id, c.full_text.as_str())).collect();

    // Chats are in id order, so every posting list comes out ascending
    let mut token_index: BTreeMap<&str, Vec<RecordId>> = BTreeMap::new();
    for chat in chats {
        for token in &chat.tokens {
            token_index.entry(token.as_str()).or_default().push(chat.record.id);
        }
    }

    write_document(out, ArchiveDocument::Records, &records)?;
    write_document(out, ArchiveDocument::TokenIndex, &token_index)?;
    write_document(out, ArchiveDocument::FullText, &full_text)?;

    Ok(token_index.len())
}

fn write_document<T: Serialize>(out: &Path, document: ArchiveDocument, value: &T) -> Result<()> {
    let path = out.join(document.file_name());
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to write {}", document))?;
    writer.flush()?;
    Ok(())
}
