//! Turns one CSV source into one typed table.
//!
//! A load walks through fixed stages:
//!
//! `ReadHeader → SampleRows → InferSchema → EmitSchema → StreamInsert → Done`
//!
//! with `Failed` reachable from any of them. Sampled rows are kept and inserted
//! ahead of the remaining rows, so nothing is read twice. A failed load does
//! not roll back; whatever was inserted stays in the engine.

use std::{io::Read, path::Path};

use csv::ByteRecord;
use log::{debug, info};

use crate::{
    config::LoadOptions,
    data::Value,
    engine::Engine,
    error::{Error, Result},
    io_utils, naming,
    schema::{Column, TableSchema},
    types::{self, CandidateType, Cast},
};

const PROGRESS_INTERVAL: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    ReadHeader,
    SampleRows,
    InferSchema,
    EmitSchema,
    StreamInsert,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub schema: TableSchema,
    pub rows: usize,
}

pub struct TableLoader<'o, R: Read> {
    reader: csv::Reader<R>,
    options: &'o LoadOptions,
    cast: Cast<'o>,
    padding: Vec<u8>,
    total_bytes: Option<u64>,
    stage: LoadStage,
    headers: Vec<String>,
    sample: Vec<ByteRecord>,
    schema: TableSchema,
    rows_inserted: usize,
}

impl<'o, R: Read> TableLoader<'o, R> {
    /// `reader` must yield the header as its first record (see [`io_utils::open_csv_reader`]).
    pub fn new(
        reader: csv::Reader<R>,
        table: impl Into<String>,
        options: &'o LoadOptions,
    ) -> Self {
        let (padding, _, _) = options.encoding.encode(&options.row_padding);
        Self {
            reader,
            options,
            cast: Cast {
                encoding: options.encoding,
                null_token: &options.null_token,
            },
            padding: padding.into_owned(),
            total_bytes: None,
            stage: LoadStage::ReadHeader,
            headers: Vec::new(),
            sample: Vec::new(),
            schema: TableSchema::new(table),
            rows_inserted: 0,
        }
    }

    /// Enables percentage progress reporting against the source size.
    pub fn with_total_bytes(mut self, total_bytes: Option<u64>) -> Self {
        self.total_bytes = total_bytes;
        self
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    /// Runs the stages that need no engine and returns the inferred schema.
    pub fn infer_schema(&mut self) -> Result<TableSchema> {
        loop {
            let next = match self.stage {
                LoadStage::ReadHeader => self.read_header(),
                LoadStage::SampleRows => self.sample_rows(),
                LoadStage::InferSchema => self.infer_columns(),
                LoadStage::EmitSchema | LoadStage::StreamInsert | LoadStage::Done => break,
                LoadStage::Failed => return Err(self.failed()),
            };
            self.transition(next)?;
        }
        Ok(self.schema.clone())
    }

    /// Runs every remaining stage, creating and filling the table in `engine`.
    pub fn load<E>(&mut self, engine: &mut E) -> Result<LoadSummary>
    where
        E: Engine + ?Sized,
    {
        loop {
            let next = match self.stage {
                LoadStage::ReadHeader | LoadStage::SampleRows | LoadStage::InferSchema => {
                    self.infer_schema().map(|_| LoadStage::EmitSchema)
                }
                LoadStage::EmitSchema => self.emit_schema(engine),
                LoadStage::StreamInsert => self.stream_insert(engine),
                LoadStage::Done => break,
                LoadStage::Failed => return Err(self.failed()),
            };
            self.transition(next)?;
        }
        Ok(LoadSummary {
            schema: self.schema.clone(),
            rows: self.rows_inserted,
        })
    }

    fn transition(&mut self, next: Result<LoadStage>) -> Result<()> {
        match next {
            Ok(stage) => {
                if stage != self.stage {
                    debug!(
                        "table '{}': {:?} -> {:?}",
                        self.schema.name, self.stage, stage
                    );
                }
                self.stage = stage;
                Ok(())
            }
            Err(err) => {
                if self.stage != LoadStage::Failed {
                    debug!(
                        "table '{}': {:?} -> Failed: {err}",
                        self.schema.name, self.stage
                    );
                }
                self.stage = LoadStage::Failed;
                Err(err)
            }
        }
    }

    fn failed(&self) -> Error {
        Error::LoadAborted(self.schema.name.clone())
    }

    fn read_header(&mut self) -> Result<LoadStage> {
        let mut record = ByteRecord::new();
        if !self.reader.read_byte_record(&mut record)? {
            return Err(Error::MissingHeader);
        }
        let headers = io_utils::decode_header(&record, self.options.encoding);
        self.headers =
            naming::dedupe_column_names(headers, self.options.auto_rename_duplicate_columns)?;
        Ok(LoadStage::SampleRows)
    }

    fn sample_rows(&mut self) -> Result<LoadStage> {
        let mut record = ByteRecord::new();
        while self.sample.len() < self.options.sample_size
            && self.reader.read_byte_record(&mut record)?
        {
            self.sample.push(record.clone());
        }
        debug!(
            "table '{}': sampled {} row(s) for type inference",
            self.schema.name,
            self.sample.len()
        );
        Ok(LoadStage::InferSchema)
    }

    fn infer_columns(&mut self) -> Result<LoadStage> {
        let rows = self
            .sample
            .iter()
            .map(|record| self.reconcile(record))
            .collect::<Result<Vec<_>>>()?;

        let mut columns = Vec::with_capacity(self.headers.len());
        for (idx, name) in self.headers.iter().enumerate() {
            let values = rows.iter().map(|row| row[idx]).collect::<Vec<_>>();
            let datatype = types::guess_type(values.as_slice(), &self.cast).ok_or_else(|| {
                Error::NoMatchingType {
                    column: name.clone(),
                    samples: values.len(),
                }
            })?;
            columns.push(Column {
                name: name.clone(),
                datatype,
            });
        }
        self.schema.columns = columns;
        info!("guessed column types: {}", self.schema);
        Ok(LoadStage::EmitSchema)
    }

    fn emit_schema<E>(&mut self, engine: &mut E) -> Result<LoadStage>
    where
        E: Engine + ?Sized,
    {
        engine.define_schema(&self.schema)?;
        Ok(LoadStage::StreamInsert)
    }

    fn stream_insert<E>(&mut self, engine: &mut E) -> Result<LoadStage>
    where
        E: Engine + ?Sized,
    {
        let sample = std::mem::take(&mut self.sample);
        let mut values = Vec::with_capacity(self.schema.len());
        for record in &sample {
            self.insert_record(record, &mut values, engine)?;
        }
        drop(sample);

        let mut record = ByteRecord::new();
        while self.reader.read_byte_record(&mut record)? {
            self.insert_record(&record, &mut values, engine)?;
        }
        info!(
            "inserted {} row(s) into table '{}'",
            self.rows_inserted, self.schema.name
        );
        Ok(LoadStage::Done)
    }

    fn insert_record<E>(
        &mut self,
        record: &ByteRecord,
        values: &mut Vec<Value>,
        engine: &mut E,
    ) -> Result<()>
    where
        E: Engine + ?Sized,
    {
        let cells = self.reconcile(record)?;
        values.clear();
        for (column, raw) in self.schema.columns.iter().zip(cells) {
            let value = column
                .datatype
                .parse(raw, &self.cast)
                .ok_or_else(|| self.conversion_error(column, raw, record_line(record)))?;
            values.push(value);
        }
        engine.insert_row(&self.schema.name, values)?;

        self.rows_inserted += 1;
        if self.rows_inserted % PROGRESS_INTERVAL == 0 {
            self.report_progress();
        }
        Ok(())
    }

    /// Applies the row-length policy and trims every present cell.
    fn reconcile<'a>(&'a self, record: &'a ByteRecord) -> Result<Vec<&'a [u8]>> {
        let expected = self.headers.len();
        let found = record.len();
        if found > expected || (found < expected && !self.options.pad_rows) {
            return Err(Error::RowLengthMismatch {
                line: record_line(record),
                expected,
                found,
            });
        }
        let mut cells = record.iter().map(<[u8]>::trim_ascii).collect::<Vec<_>>();
        cells.resize(expected, self.padding.as_slice());
        Ok(cells)
    }

    fn conversion_error(&self, column: &Column, raw: &[u8], line: u64) -> Error {
        match column.datatype {
            CandidateType::Text => Error::InvalidEncoding {
                column: column.name.clone(),
                line,
                encoding: self.options.encoding.name(),
                bytes: raw.to_vec(),
            },
            datatype => Error::TypeConversionFailure {
                column: column.name.clone(),
                line,
                value: self
                    .options
                    .encoding
                    .decode_without_bom_handling(raw)
                    .0
                    .into_owned(),
                datatype: datatype.sql_type(),
            },
        }
    }

    fn report_progress(&self) {
        let position = self.reader.position().byte();
        match self.total_bytes {
            Some(total) if total > 0 => info!(
                "loaded {:.2}% of csv file into table '{}'",
                100.0 * position as f64 / total as f64,
                self.schema.name
            ),
            _ => info!(
                "loaded {} row(s) into table '{}'",
                self.rows_inserted, self.schema.name
            ),
        }
    }
}

fn record_line(record: &ByteRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

/// Loads the CSV file at `path` into a new table named `table`.
pub fn load_file<E>(
    engine: &mut E,
    path: &Path,
    table: &str,
    options: &LoadOptions,
) -> Result<LoadSummary>
where
    E: Engine + ?Sized,
{
    info!("creating table '{table}' from csv file: {}", path.display());
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    TableLoader::new(reader, table, options)
        .with_total_bytes(io_utils::input_size(path))
        .load(engine)
}

/// Infers the schema of the CSV file at `path` without loading it anywhere.
pub fn probe_file(path: &Path, table: &str, options: &LoadOptions) -> Result<TableSchema> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    TableLoader::new(reader, table, options).infer_schema()
}
