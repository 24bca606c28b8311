use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    config::{DEFAULT_SAMPLE_ROWS, LoadOptions, TableNaming},
    error::Result,
    io_utils,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Run SQL queries against CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load CSV files as tables, run one SQL query, and write the result as CSV
    Query(QueryArgs),
    /// Load CSV files as tables and read SQL queries line by line from stdin
    Console(ConsoleArgs),
    /// Print the table name and inferred column types for each CSV file
    Probe(ProbeArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Input CSV files; each becomes one table ('-' reads stdin)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Number of rows to sample when inferring column types
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS, value_parser = parse_sample_rows)]
    pub sample_rows: usize,
    /// Fail on rows whose length differs from the header instead of padding short rows
    #[arg(long = "strict-rows")]
    pub strict_rows: bool,
    /// Fail on duplicate header names instead of renaming them (a, a2, a3, ...)
    #[arg(long = "no-rename-duplicates")]
    pub no_rename_duplicates: bool,
    /// Value used to fill missing trailing cells of short rows
    #[arg(long = "row-padding", default_value = "")]
    pub row_padding: String,
    /// Cell text loaded as NULL in numeric columns
    #[arg(long = "null-token", default_value = "")]
    pub null_token: String,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Name tables csv, csv2, ... instead of after their files
    #[arg(long = "generic-table-names")]
    pub generic_table_names: bool,
}

impl LoadArgs {
    pub fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            auto_rename_duplicate_columns: !self.no_rename_duplicates,
            encoding: io_utils::resolve_encoding(self.input_encoding.as_deref())?,
            sample_size: self.sample_rows,
            row_padding: self.row_padding.clone(),
            pad_rows: !self.strict_rows,
            null_token: self.null_token.clone(),
            delimiter: self.delimiter,
        })
    }

    pub fn table_naming(&self) -> TableNaming {
        if self.generic_table_names {
            TableNaming::Generic
        } else {
            TableNaming::ByFilename
        }
    }
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// SQL query to run against the loaded tables
    #[arg(short = 'q', long = "query")]
    pub query: String,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output CSV delimiter character (defaults to ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding for the output (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Debug, Args)]
pub struct ConsoleArgs {
    /// Output CSV delimiter character (defaults to ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding for the output (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub load: LoadArgs,
}

fn parse_sample_rows(value: &str) -> Result<usize, String> {
    let rows: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a row count"))?;
    if rows == 0 {
        return Err("Sample size must be at least 1".to_string());
    }
    Ok(rows)
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
