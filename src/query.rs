//! Multi-file sessions: name the tables, load each file, run a query, and
//! stream the result back out as CSV.

use std::{
    collections::HashSet,
    io::Write,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use log::info;

use crate::{
    config::{LoadOptions, TableNaming},
    data::Value,
    engine::{Engine, RowSink, SqliteEngine},
    error::Result,
    format, io_utils, loader, naming,
    schema::TableSchema,
};

const GENERIC_TABLE_NAME: &str = "csv";
const STDIN_TABLE_NAME: &str = "stdin";

/// Picks a unique table name for every file, left to right.
pub fn choose_table_names<P>(files: &[P], policy: TableNaming) -> Vec<String>
where
    P: AsRef<Path>,
{
    naming::assign_unique(files.iter().map(|file| table_base_name(file.as_ref(), policy)))
}

fn table_base_name(path: &Path, policy: TableNaming) -> String {
    match policy {
        TableNaming::Generic => GENERIC_TABLE_NAME.to_string(),
        TableNaming::ByFilename if io_utils::is_dash(path) => STDIN_TABLE_NAME.to_string(),
        TableNaming::ByFilename => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| GENERIC_TABLE_NAME.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub schema: TableSchema,
    pub rows: usize,
}

/// Tables loaded for one query run or one console, plus the engine holding them.
pub struct Session<E: Engine = SqliteEngine> {
    engine: E,
    tables: Vec<LoadedTable>,
}

impl Session<SqliteEngine> {
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(SqliteEngine::open_in_memory()?))
    }
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            tables: Vec::new(),
        }
    }

    /// Loads `files` in order, one table each, naming them after any tables
    /// already present. Stops at the first failure.
    pub fn load_files<P>(
        &mut self,
        files: &[P],
        policy: TableNaming,
        options: &LoadOptions,
    ) -> Result<&[LoadedTable]>
    where
        P: AsRef<Path>,
    {
        let start = self.tables.len();
        let mut taken = self
            .tables
            .iter()
            .map(|t| naming::name_key(&t.schema.name))
            .collect::<HashSet<_>>();
        for file in files {
            let name = naming::unique_name(&table_base_name(file.as_ref(), policy), &taken);
            taken.insert(naming::name_key(&name));
            let summary = loader::load_file(&mut self.engine, file.as_ref(), &name, options)?;
            self.tables.push(LoadedTable {
                path: file.as_ref().to_path_buf(),
                schema: summary.schema,
                rows: summary.rows,
            });
        }
        Ok(&self.tables[start..])
    }

    pub fn tables(&self) -> &[LoadedTable] {
        &self.tables
    }

    pub fn query(&self, sql: &str, sink: &mut dyn RowSink) -> Result<()> {
        self.engine.execute_query(sql, sink)
    }
}

/// Writes a result set as CSV: header row, then one formatted row per tuple.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    encoding: &'static Encoding,
    rows: usize,
}

impl<W: Write> CsvSink<W> {
    /// `encoding` is the one blob cells are read in.
    pub fn new(writer: csv::Writer<W>, encoding: &'static Encoding) -> Self {
        Self {
            writer,
            encoding,
            rows: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn columns(&mut self, names: &[String]) -> Result<()> {
        if !names.is_empty() {
            self.writer.write_record(names)?;
        }
        Ok(())
    }

    fn row(&mut self, values: &[Value]) -> Result<()> {
        self.writer
            .write_record(format::format_row(values, self.encoding))?;
        self.rows += 1;
        Ok(())
    }
}

/// Batch mode: load `files` into a fresh in-memory session, run `sql`, write CSV to `output`.
pub fn run_query<P, W>(
    sql: &str,
    files: &[P],
    policy: TableNaming,
    options: &LoadOptions,
    output: csv::Writer<W>,
) -> Result<usize>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut session = Session::in_memory()?;
    session.load_files(files, policy, options)?;
    let mut sink = CsvSink::new(output, options.encoding);
    session.query(sql, &mut sink)?;
    sink.flush()?;
    info!("query returned {} row(s)", sink.rows());
    Ok(sink.rows())
}
