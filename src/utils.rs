use crate::error::LoadError;
use polars::prelude::*;
use std::io;
use std::path::Path;

/// Fails with [`LoadError::NotFound`] unless `path` exists and is a regular file.
pub(crate) fn ensure_file_exists(path: &Path) -> Result<(), LoadError> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(LoadError::Io(
                    path.to_path_buf(),
                    io::Error::new(io::ErrorKind::Other, "path exists but is not a file"),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoadError::NotFound(path.to_path_buf())),
        Err(e) => Err(LoadError::Io(path.to_path_buf(), e)),
    }
}

/// Fails with [`LoadError::RaggedRow`] on the first data row whose field count
/// differs from the header, or from the first row when there is no header.
///
/// Other malformed input is left for the polars reader to report.
pub(crate) fn check_row_widths(
    path: &Path,
    has_header: bool,
    separator: u8,
) -> Result<(), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .delimiter(separator)
        .flexible(false)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    for result in reader.byte_records() {
        if let Err(e) = result {
            return match e.into_kind() {
                csv::ErrorKind::UnequalLengths {
                    pos,
                    expected_len,
                    len,
                } => {
                    // Record indices start at 0 and include the header.
                    let record = pos.map_or(0, |p| p.record()) as usize;
                    Err(LoadError::RaggedRow {
                        path: path.to_path_buf(),
                        row: if has_header { record } else { record + 1 },
                        expected: expected_len as usize,
                        found: len as usize,
                    })
                }
                csv::ErrorKind::Io(e) => Err(LoadError::Io(path.to_path_buf(), e)),
                _ => Ok(()),
            };
        }
    }
    Ok(())
}

fn csv_error(path: &Path, e: csv::Error) -> LoadError {
    match e.into_kind() {
        csv::ErrorKind::Io(e) => LoadError::Io(path.to_path_buf(), e),
        other => LoadError::Io(
            path.to_path_buf(),
            io::Error::new(io::ErrorKind::InvalidData, format!("{other:?}")),
        ),
    }
}

/// Reads a delimited file with every column typed as `String`.
///
/// Every data row must have as many fields as the header. Type conversion is
/// left to the caller so that each cell can be converted against an explicit
/// schema and failures can name the exact row and column. Empty cells come back
/// as nulls.
pub(crate) fn read_string_frame(
    path: &Path,
    has_header: bool,
    separator: u8,
) -> Result<DataFrame, LoadError> {
    ensure_file_exists(path)?;
    check_row_widths(path, has_header, separator)?;

    CsvReadOptions::default()
        .with_has_header(has_header)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| LoadError::Csv(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| LoadError::Csv(path.to_path_buf(), e))
}

/// Looks up a string column by name, reporting a missing column as a schema mismatch.
pub(crate) fn string_column<'a>(
    df: &'a DataFrame,
    name: &str,
    path: &Path,
) -> Result<&'a StringChunked, LoadError> {
    let column = df.column(name).map_err(|_| LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })?;
    column
        .str()
        .map_err(|e| LoadError::Csv(path.to_path_buf(), e))
}
