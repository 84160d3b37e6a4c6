//! Integration tests driving the `arcview` binary end to end: build an
//! archive from the fixture chats, then query it through each command.

mod common;

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tempfile::TempDir;

static ARCHIVE: OnceLock<TempDir> = OnceLock::new();

/// Command isolated from the user's config and environment
fn arcview(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_arcview"));
    cmd.env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("ARCVIEW_ARCHIVE")
        .env_remove("ARCVIEW_LOG");
    cmd
}

/// Build the fixture archive once per test run
fn archive_dir() -> PathBuf {
    let dir = ARCHIVE.get_or_init(|| {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let output = arcview(dir.path())
            .arg("build")
            .arg(common::chats_dir())
            .arg("--out")
            .arg(dir.path().join("public"))
            .arg("--quiet")
            .output()
            .expect("Failed to run arcview build");

        if !output.status.success() {
            panic!(
                "arcview build failed: {}\nstdout: {}",
                String::from_utf8_lossy(&output.stderr),
                String::from_utf8_lossy(&output.stdout)
            );
        }
        dir
    });
    dir.path().join("public")
}

fn run(args: &[&str]) -> Output {
    let archive = archive_dir();
    let home = archive.parent().expect("archive has a parent");
    arcview(home)
        .arg("--archive")
        .arg(&archive)
        .args(args)
        .output()
        .expect("Failed to run arcview")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "arcview failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_build_writes_three_documents() {
    let archive = archive_dir();
    for name in [
        "database.json",
        "search_index_word.json",
        "search_index_full_text.json",
    ] {
        assert!(archive.join(name).is_file(), "missing {name}");
    }

    let records: Value =
        serde_json::from_slice(&std::fs::read(archive.join("database.json")).unwrap()).unwrap();
    assert_eq!(records["1"]["title"], "gardening notes");
    assert_eq!(records["3"]["title"], "rust proxy");
    assert_eq!(records["3"]["msg_count"], 4);
}

#[test]
fn test_search_by_words() {
    let output = run(&["search", "--no-color", "caching", "proxy"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected output: {stdout}");
    assert!(lines[0].contains("rust proxy"));
    assert!(lines[0].contains("4 msgs"));
}

#[test]
fn test_search_json_carries_query_in_href() {
    let rows = stdout_json(&run(&["search", "--json", "caching"]));
    let rows = rows.as_array().expect("array of rows");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 3);
    assert_eq!(rows[0]["href"], "#/chat/3?q=caching");
}

#[test]
fn test_search_pattern_mode_matches_substrings() {
    // "fros" is not a token, but appears inside "frost"
    let words = stdout_json(&run(&["search", "--json", "fros"]));
    assert!(words.as_array().unwrap().is_empty());

    let pattern = stdout_json(&run(&["search", "--json", "--pattern", "fros"]));
    let ids: Vec<&Value> = pattern.as_array().unwrap().iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&Value::from(1)]);
}

#[test]
fn test_search_without_results_reports_on_stderr() {
    let output = run(&["search", "kubernetes"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No conversations match"));
}

#[test]
fn test_render_list_view() {
    let instruction = stdout_json(&run(&["render", "#/"]));
    assert_eq!(instruction["view"], "list");

    // rust proxy has the most messages, then ties by id
    let ids: Vec<u64> = instruction["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_render_detail_with_highlights() {
    let instruction = stdout_json(&run(&["render", "#/chat/3?q=caching"]));
    assert_eq!(instruction["view"], "detail");
    assert_eq!(instruction["span_count"], 3);
    assert_eq!(instruction["messages"].as_array().unwrap().len(), 4);
    assert_eq!(instruction["messages"][0]["speaker"], "prompt");
}

#[test]
fn test_render_escapes_transcript_markup() {
    let instruction = stdout_json(&run(&["render", "#/chat/2"]));
    let prompt = instruction["messages"][0]["html"].as_str().unwrap();
    assert!(prompt.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!prompt.contains("<script>"));

    let response = instruction["messages"][1]["html"].as_str().unwrap();
    assert!(response.contains("R&amp;D becomes R&amp;amp;D"));
}

#[test]
fn test_render_unknown_record_falls_back_to_list() {
    let instruction = stdout_json(&run(&["render", "#/chat/99"]));
    assert_eq!(instruction["view"], "list");
}

#[test]
fn test_render_missing_archive_is_fatal() {
    let dir = TempDir::new().unwrap();
    let output = arcview(dir.path())
        .arg("--archive")
        .arg(dir.path().join("nowhere"))
        .args(["render", "#/"])
        .output()
        .expect("Failed to run arcview");

    assert!(!output.status.success());
    let instruction: Value = serde_json::from_slice(&output.stdout).expect("fatal JSON");
    assert_eq!(instruction["view"], "fatal");
    assert!(instruction["error"].as_str().unwrap().contains("database.json"));
}

#[test]
fn test_stats_summarises_archive() {
    let output = run(&["stats"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Conversations:    3"));
    assert!(stdout.contains("Messages:         8"));
    assert!(stdout.contains("Longest conversations:"));
}
