//! JSON Lines helpers.
//!
//! Reading is resilient: a malformed line becomes a [`MalformedLine`]
//! instead of failing the whole file. Writing is atomic: records go to a
//! `.tmp` sibling which is then renamed over the target, so a crash leaves
//! either the old file or the new one, never a torn write.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number
    pub line_number: usize,

    /// Parser error text
    pub error: String,
}

/// Read every parseable record from a JSONL file.
///
/// Blank lines are ignored. Lines that fail to deserialize are collected as
/// [`MalformedLine`]s and skipped.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read.
pub async fn read_jsonl_resilient<T: DeserializeOwned>(
    path: &Path,
) -> Result<(Vec<T>, Vec<MalformedLine>)> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut records = Vec::new();
    let mut malformed = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(line_number, error = %e, "Skipping malformed JSONL line");
                malformed.push(MalformedLine {
                    line_number,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok((records, malformed))
}

/// Atomically write `values` to `path`, one JSON document per line.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails. On failure
/// the original file is left untouched and the temp file is removed on a
/// best-effort basis.
pub async fn write_jsonl_atomic<'a, T, I>(path: &Path, values: I) -> Result<()>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let temp_path = temp_path_for(path);

    if let Err(e) = write_lines(&temp_path, values).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

async fn write_lines<'a, T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = BufWriter::new(file);
    for value in values {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(())
}

/// `file.jsonl` -> `file.jsonl.tmp`, `file` -> `file.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(extension);
    temp_path
}
