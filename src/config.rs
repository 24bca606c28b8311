use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_SAMPLE_ROWS: usize = 10_000;

/// Knobs for turning one CSV file into one table.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Suffix repeated header names (`a`, `a2`, ...) instead of failing the load.
    pub auto_rename_duplicate_columns: bool,
    pub encoding: &'static Encoding,
    /// Number of data rows buffered for type inference.
    pub sample_size: usize,
    /// Filler for trailing cells missing from a short row.
    pub row_padding: String,
    /// Pad short rows; when false every row must match the header length.
    pub pad_rows: bool,
    /// Trimmed cell text treated as NULL by the numeric types.
    pub null_token: String,
    /// Field delimiter; `None` picks one from the file extension.
    pub delimiter: Option<u8>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            auto_rename_duplicate_columns: true,
            encoding: UTF_8,
            sample_size: DEFAULT_SAMPLE_ROWS,
            row_padding: String::new(),
            pad_rows: true,
            null_token: String::new(),
            delimiter: None,
        }
    }
}

/// How table names are derived from input files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableNaming {
    /// File name without its extension.
    #[default]
    ByFilename,
    /// `csv`, `csv2`, `csv3`, ...
    Generic,
}
