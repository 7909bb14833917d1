//! CSV readers and writers for the persisted tables.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};

use leaderpulse_core::{CleanedPost, FrequencyRecord, PostRecord};

use crate::StoreError;

/// Header of the raw posts table, in [`PostRecord`] field order.
pub const RAW_COLUMNS: [&str; 14] = [
    "id",
    "handle",
    "user_name",
    "created_at",
    "date",
    "date_week",
    "lang",
    "full_text",
    "is_retweet",
    "retweet_count",
    "favorite_count",
    "location",
    "place",
    "hashtags",
];

const CLEAN_EXTRA_COLUMNS: [&str; 4] = ["clean_text", "break_text", "polarity", "subjectivity"];

/// Header of the word and phrase count tables.
pub const FREQUENCY_COLUMNS: [&str; 5] = ["term", "handle", "count", "total_count", "rank"];

/// Full header of the cleaned table: raw columns, derived columns, then one
/// mention column per roster entity.
#[must_use]
pub fn clean_columns(mention_columns: &[String]) -> Vec<String> {
    RAW_COLUMNS
        .iter()
        .chain(CLEAN_EXTRA_COLUMNS.iter())
        .map(|c| (*c).to_string())
        .chain(mention_columns.iter().cloned())
        .collect()
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: display(path),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: display(path),
        source,
    }
}

/// Read the raw posts table, failing fast on a header that is not
/// exactly [`RAW_COLUMNS`].
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be opened,
/// [`StoreError::SchemaMismatch`] on a header mismatch, and
/// [`StoreError::InvalidRow`] for a row that does not deserialize.
pub fn read_posts(path: &Path) -> Result<Vec<PostRecord>, StoreError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers().map_err(|e| csv_err(path, e))?.clone();
    check_header(path, &headers, &RAW_COLUMNS)?;

    let mut posts = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_err(path, e))?;
        let line = record.position().map_or(0, csv::Position::line);
        let post: PostRecord =
            record
                .deserialize(Some(&headers))
                .map_err(|e| StoreError::InvalidRow {
                    path: display(path),
                    line,
                    reason: e.to_string(),
                })?;
        posts.push(post);
    }

    tracing::debug!(path = %path.display(), rows = posts.len(), "read raw table");
    Ok(posts)
}

/// Like [`read_posts`], but a missing file is an empty dataset.
///
/// # Errors
///
/// See [`read_posts`].
pub fn read_posts_if_exists(path: &Path) -> Result<Vec<PostRecord>, StoreError> {
    if path.exists() {
        read_posts(path)
    } else {
        tracing::info!(path = %path.display(), "no existing raw table; starting empty");
        Ok(Vec::new())
    }
}

fn check_header(path: &Path, found: &StringRecord, expected: &[&str]) -> Result<(), StoreError> {
    if found.iter().eq(expected.iter().copied()) {
        return Ok(());
    }
    Err(StoreError::SchemaMismatch {
        path: display(path),
        expected: expected.join(","),
        found: found.iter().collect::<Vec<_>>().join(","),
    })
}

/// Rewrite the raw posts table.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Csv`] if the table cannot be
/// written; the previous file is left untouched in that case.
pub fn write_posts(path: &Path, posts: &[PostRecord]) -> Result<(), StoreError> {
    write_atomically(path, |writer| {
        writer.write_record(RAW_COLUMNS)?;
        for post in posts {
            writer.serialize(post)?;
        }
        Ok(())
    })?;
    tracing::info!(path = %path.display(), rows = posts.len(), "wrote raw table");
    Ok(())
}

/// Rewrite the cleaned posts table.
///
/// `mention_columns` fixes the header; each post's mention flags are written
/// in that order.
///
/// # Errors
///
/// Returns [`StoreError::InvalidRow`] if a post's mention flags do not line
/// up with `mention_columns`, otherwise as [`write_posts`].
pub fn write_cleaned(
    path: &Path,
    cleaned: &[CleanedPost],
    mention_columns: &[String],
) -> Result<(), StoreError> {
    for (i, c) in cleaned.iter().enumerate() {
        let aligned = c.mentions.len() == mention_columns.len()
            && c
                .mentions
                .iter()
                .zip(mention_columns)
                .all(|((name, _), col)| name == col);
        if !aligned {
            return Err(StoreError::InvalidRow {
                path: display(path),
                line: i as u64 + 2,
                reason: format!("mention flags for post {} do not match header", c.post.id),
            });
        }
    }

    let header = clean_columns(mention_columns);
    write_atomically(path, |writer| {
        writer.write_record(&header)?;
        for c in cleaned {
            writer.write_record(clean_row(c))?;
        }
        Ok(())
    })?;
    tracing::info!(path = %path.display(), rows = cleaned.len(), "wrote cleaned table");
    Ok(())
}

fn clean_row(c: &CleanedPost) -> Vec<String> {
    let p = &c.post;
    let mut row = vec![
        p.id.to_string(),
        p.handle.clone(),
        p.user_name.clone(),
        p.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        p.date.to_string(),
        p.date_week.to_string(),
        p.lang.clone(),
        p.full_text.clone(),
        p.is_retweet.to_string(),
        p.retweet_count.to_string(),
        p.favorite_count.to_string(),
        p.location.clone(),
        p.place.clone(),
        p.hashtags.clone(),
        c.clean_text.clone(),
        c.break_text.clone(),
        c.polarity.to_string(),
        c.subjectivity.to_string(),
    ];
    row.extend(c.mentions.iter().map(|(_, flag)| flag.to_string()));
    row
}

/// Rewrite a word or phrase count table.
///
/// # Errors
///
/// As [`write_posts`].
pub fn write_frequencies(path: &Path, rows: &[FrequencyRecord]) -> Result<(), StoreError> {
    write_atomically(path, |writer| {
        writer.write_record(FREQUENCY_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        Ok(())
    })?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote frequency table");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write through a temp file in the same directory, then rename over `path`.
/// Headers are written explicitly by `fill` so empty tables still get one.
fn write_atomically<F>(path: &Path, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut Writer<File>) -> Result<(), csv::Error>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = temp_path(path);
    let result = write_then_rename(&tmp, path, fill);
    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::debug!(path = %tmp.display(), error = %e, "temp file cleanup failed");
        }
    }
    result
}

fn write_then_rename<F>(tmp: &Path, path: &Path, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut Writer<File>) -> Result<(), csv::Error>,
{
    let file = File::create(tmp).map_err(|e| io_err(tmp, e))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    fill(&mut writer).map_err(|e| csv_err(tmp, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| io_err(tmp, e.into_error()))?;
    file.sync_all().map_err(|e| io_err(tmp, e))?;
    fs::rename(tmp, path).map_err(|e| io_err(path, e))
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;
