//! Combine per-device outputs into single datasets.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::app::Result;
use crate::store::files::{read_links_if_exists, read_rows, write_links, write_rows};

/// Union of every existing link file, sorted, written to `out`.
/// Returns the number of distinct links.
pub fn merge_links(link_files: &[PathBuf], out: &Path) -> Result<usize> {
    let mut all = BTreeSet::new();
    for path in link_files {
        match read_links_if_exists(path)? {
            Some(links) => all.extend(links),
            None => info!("Skipping missing link file {}", path.display()),
        }
    }

    let links: Vec<String> = all.into_iter().collect();
    write_links(out, &links)?;
    Ok(links.len())
}

/// Concatenate every `.csv` under `results_dir` into `out` under one header.
/// Files that don't parse as result chunks are logged and skipped.
/// Returns the number of rows written.
pub fn merge_results(results_dir: &Path, out: &Path) -> Result<usize> {
    let mut files = Vec::new();
    collect_csv_files(results_dir, &mut files)?;
    files.sort();

    let mut rows = Vec::new();
    for path in files.iter().filter(|p| p.as_path() != out) {
        match read_rows(path) {
            Ok(file_rows) => rows.extend(file_rows),
            Err(e) => warn!("Skipping unreadable {}: {}", path.display(), e),
        }
    }

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_rows(File::create(out)?, &rows)?;
    Ok(rows.len())
}

fn collect_csv_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_csv_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutputRow, ParseResult};
    use crate::store::files::{chunk_path, read_links, write_chunk};

    #[test]
    fn test_merge_links_unions_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("links_part_1.csv");
        let b = dir.path().join("links_part_2.csv");
        let missing = dir.path().join("links_part_3.csv");
        write_links(&a, &["https://s.example/app/3/".into(), "https://s.example/app/1/".into()])
            .unwrap();
        write_links(&b, &["https://s.example/app/2/".into(), "https://s.example/app/1/".into()])
            .unwrap();

        let out = dir.path().join("steam_links.csv");
        let count = merge_links(&[a, b, missing], &out).unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            read_links(&out).unwrap(),
            vec![
                "https://s.example/app/1/",
                "https://s.example/app/2/",
                "https://s.example/app/3/",
            ]
        );
    }

    #[test]
    fn test_merge_results_concatenates_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let row = |n: u32| OutputRow::from(ParseResult::failed(format!("https://s.example/app/{n}/"), "x"));

        write_chunk(&chunk_path(&results, 1, 1), &[row(1), row(2)]).unwrap();
        write_chunk(&chunk_path(&results, 2, 1), &[row(3)]).unwrap();
        write_chunk(&chunk_path(&results.join("old"), 3, 1), &[row(4)]).unwrap();
        fs::write(results.join("notes.txt"), "ignored").unwrap();

        let out = dir.path().join("steam_full.csv");
        assert_eq!(merge_results(&results, &out).unwrap(), 4);

        let merged = read_rows(&out).unwrap();
        let urls: Vec<_> = merged.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://s.example/app/1/",
                "https://s.example/app/2/",
                "https://s.example/app/3/",
                "https://s.example/app/4/",
            ]
        );
    }

    #[test]
    fn test_merge_results_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let row = OutputRow::from(ParseResult::failed("https://s.example/app/1/", "x"));
        write_chunk(&chunk_path(&results, 1, 1), &[row]).unwrap();
        fs::write(results.join("stray.csv"), "a,b\n1,2,3\n").unwrap();

        let out = dir.path().join("steam_full.csv");
        assert_eq!(merge_results(&results, &out).unwrap(), 1);
        assert_eq!(read_rows(&out).unwrap()[0].url, "https://s.example/app/1/");
    }

    #[test]
    fn test_merge_results_empty_dir_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("steam_full.csv");
        assert_eq!(merge_results(&dir.path().join("results"), &out).unwrap(), 0);
        assert!(read_rows(&out).unwrap().is_empty());
    }
}
