pub mod cli;
pub mod config;
pub mod console;
pub mod data;
pub mod engine;
pub mod error;
pub mod format;
pub mod io_utils;
pub mod loader;
pub mod naming;
pub mod query;
pub mod schema;
pub mod types;

use std::{
    env,
    io::{self, Write},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands},
    console::ConsoleOutput,
    io_utils::DEFAULT_CSV_DELIMITER,
    query::Session,
    schema::TableSchema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csvquery", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Query(args) => handle_query(&args),
        Commands::Console(args) => handle_console(&args),
        Commands::Probe(args) => handle_probe(&args),
    }
}

fn handle_query(args: &cli::QueryArgs) -> Result<()> {
    let options = args.load.load_options()?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    debug!("Load options: {options:?}");
    let writer = io_utils::open_csv_writer(
        args.output.as_deref(),
        args.output_delimiter.unwrap_or(DEFAULT_CSV_DELIMITER),
        output_encoding,
    )
    .with_context(|| format!("Opening output {:?}", args.output))?;
    let rows = query::run_query(
        &args.query,
        &args.load.files,
        args.load.table_naming(),
        &options,
        writer,
    )
    .with_context(|| format!("Running query against {:?}", args.load.files))?;
    info!(
        "Wrote {rows} row(s) to {}",
        args.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}

fn handle_console(args: &cli::ConsoleArgs) -> Result<()> {
    let options = args.load.load_options()?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let mut session = Session::in_memory()?;
    let loaded = session
        .load_files(&args.load.files, args.load.table_naming(), &options)
        .with_context(|| format!("Loading {:?}", args.load.files))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for table in loaded {
        writeln!(
            out,
            "* file '{}' loaded into table '{}'",
            table.path.display(),
            table.schema.name
        )?;
    }
    let output = ConsoleOutput {
        encoding: options.encoding,
        output_encoding,
        delimiter: args.output_delimiter.unwrap_or(DEFAULT_CSV_DELIMITER),
    };
    let executed = console::run_console(&session, io::stdin().lock(), out, io::stderr(), output)?;
    debug!("Console ran {executed} query(ies)");
    Ok(())
}

#[derive(Serialize)]
struct ProbeReport<'a> {
    file: String,
    table: &'a TableSchema,
}

fn handle_probe(args: &cli::ProbeArgs) -> Result<()> {
    let options = args.load.load_options()?;
    let names = query::choose_table_names(&args.load.files, args.load.table_naming());
    let mut schemas = Vec::with_capacity(names.len());
    for (path, name) in args.load.files.iter().zip(&names) {
        let schema = loader::probe_file(path, name, &options)
            .with_context(|| format!("Inferring schema from {path:?}"))?;
        schemas.push((path, schema));
    }
    let reports = schemas
        .iter()
        .map(|(path, schema)| ProbeReport {
            file: path.display().to_string(),
            table: schema,
        })
        .collect::<Vec<_>>();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &reports).context("Writing probe report")?;
    writeln!(out)?;
    Ok(())
}
