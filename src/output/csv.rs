// src/output/csv.rs
// =============================================================================
// CSV export of the collected tags.
//
// File layout:
//   followers_count,icon_url,id,items_count
//   120,https://...,Rust,9000
//   ...
//
// The header row is always written, even when there are no tags. The file is
// truncated first, so running the export twice against the same data gives
// byte-identical output.
// =============================================================================

use crate::error::{Error, Result};
use crate::qiita::Tag;
use csv::WriterBuilder;
use log::info;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

// Writes `tags` to `path`, replacing whatever was there
//
// Returns: number of data rows written (header not included)
pub fn write_tags(path: &Path, tags: &[Tag]) -> Result<usize> {
    let output_error = |source: csv::Error| Error::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = open_truncated(path).map_err(|e| output_error(e.into()))?;

    // Header is written by hand so an empty export still has one
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer
        .write_record(Tag::CSV_HEADERS)
        .map_err(output_error)?;
    for tag in tags {
        writer.serialize(tag).map_err(output_error)?;
    }
    writer.flush().map_err(|e| output_error(e.into()))?;

    info!("wrote {} tags to {}", tags.len(), path.display());
    Ok(tags.len())
}

fn open_truncated(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    // Only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
