//! Link files and chunk output files.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::domain::OutputRow;

/// Marker that lets spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write one URL per line, no header, replacing any previous file.
pub fn write_links(path: &Path, links: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for link in links {
        writer.write_record([link])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a link file written by [`write_links`], keeping file order.
pub fn read_links(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut links = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(link) = record.get(0).map(str::trim).filter(|l| !l.is_empty()) {
            links.push(link.to_string());
        }
    }
    Ok(links)
}

/// Like [`read_links`], but a missing file reads as `None`.
pub fn read_links_if_exists(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    read_links(path).map(Some)
}

/// Output file for chunk `index` of `device_id`.
pub fn chunk_path(results_dir: &Path, device_id: usize, index: usize) -> PathBuf {
    results_dir.join(format!("data_part_{device_id}_{index}.csv"))
}

/// Index after the highest chunk `device_id` already has in `results_dir`.
pub fn next_chunk_index(results_dir: &Path, device_id: usize) -> Result<usize> {
    let entries = match fs::read_dir(results_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(e.into()),
    };

    let prefix = format!("data_part_{device_id}_");
    let mut highest = 0;
    for entry in entries {
        let name = entry?.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix(&prefix))
            .and_then(|n| n.strip_suffix(".csv"))
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(index) = index {
            highest = highest.max(index);
        }
    }
    Ok(highest + 1)
}

/// Write a complete chunk file. Fails if `path` already exists.
pub fn write_chunk(path: &Path, rows: &[OutputRow]) -> Result<()> {
    ensure_parent(path)?;
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    write_rows(file, rows)
}

/// BOM, header, rows. The header is written even with no rows.
pub fn write_rows(mut file: File, rows: &[OutputRow]) -> Result<()> {
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(OutputRow::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a chunk file back, tolerating a leading BOM.
pub fn read_rows(path: &Path) -> Result<Vec<OutputRow>> {
    let bytes = fs::read(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let mut reader = csv::Reader::from_reader(body);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
