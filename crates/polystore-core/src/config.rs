//! Configuration shapes shared with this crate's external collaborators
//! (file-format readers, the secrets manager) — both out of scope for
//! `polystore-core` itself, which defines these types only to give those
//! collaborators a stable contract to build against.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The compression codec a writer should apply to a saved table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompressionKind {
    /// No compression.
    #[default]
    None,
    /// Snappy block compression.
    Snappy,
    /// Zstandard compression.
    Zstd,
    /// Gzip/deflate compression.
    Gzip,
}

/// Options controlling how an external reader loads tabular data into a
/// [`crate::table::Table`].
///
/// `polystore-core` never performs I/O using these options itself; it
/// only defines the shape so a collaborating file-format reader has a
/// stable contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Overrides the table name the reader would otherwise infer.
    pub table_name: Option<String>,
    /// Whether the first row is a header naming each column.
    pub header: bool,
    /// The field delimiter for delimiter-separated formats.
    pub delimiter: char,
    /// The quote character for delimiter-separated formats.
    pub quote_char: char,
    /// The number of leading rows to skip before data begins.
    pub skip_rows: usize,
    /// Caps the number of rows read, if set.
    pub max_rows: Option<usize>,
    /// Restricts which columns are read, by name, if set.
    pub columns: Option<Vec<String>>,
    /// The number of rows to sample when inferring column types.
    pub sample_size: usize,
    /// Whether to infer `DataType`s from sampled values rather than
    /// requiring an explicit schema.
    pub infer_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            table_name: None,
            header: true,
            delimiter: ',',
            quote_char: '"',
            skip_rows: 0,
            max_rows: None,
            columns: None,
            sample_size: 1_000,
            infer_types: true,
        }
    }
}

/// Options controlling how an external writer saves a [`crate::table::Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// The compression codec to apply.
    pub compression: CompressionKind,
    /// The number of rows per row group, for formats that batch rows.
    pub row_group_size: usize,
    /// Whether to embed schema metadata alongside the data.
    pub include_metadata: bool,
    /// Whether to write a header row naming each column.
    pub include_header: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compression: CompressionKind::None,
            row_group_size: 10_000,
            include_metadata: true,
            include_header: true,
        }
    }
}

/// Crate-wide configuration. `master_password` is defined here only so
/// the (out-of-scope) secrets manager has a stable field name to read;
/// `polystore-core` never reads it itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where checkpoint and audit-log files are written, if file-backed
    /// persistence is in use.
    pub storage_path: Option<PathBuf>,
    /// A master password handed to the (out-of-scope) secrets manager.
    pub master_password: Option<String>,
}
