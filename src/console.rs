//! Line-oriented SQL console over a loaded [`Session`].
//!
//! One query per line. An empty line, a line ending in `EOF`, or end of input
//! ends the session. Engine errors are reported on the error stream and the
//! loop carries on; anything else aborts it.

use std::io::{BufRead, Write};

use encoding_rs::Encoding;

use crate::{
    engine::Engine,
    error::Result,
    io_utils,
    query::{CsvSink, Session},
};

pub const PROMPT: &str = "=> ";
pub const BANNER: &str = "SQL Interactive Console";
const END_OF_INPUT_MARKER: &str = "EOF";

#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput {
    /// Encoding blob cells are read in.
    pub encoding: &'static Encoding,
    /// Encoding the CSV result text is written in.
    pub output_encoding: &'static Encoding,
    pub delimiter: u8,
}

/// `true` when `line` asks the console to stop.
pub fn is_end_of_session(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.ends_with(END_OF_INPUT_MARKER)
}

/// Runs the read loop until the session ends. Returns the number of queries run.
pub fn run_console<E, R, W, X>(
    session: &Session<E>,
    mut input: R,
    mut out: W,
    mut err: X,
    output: ConsoleOutput,
) -> Result<usize>
where
    E: Engine,
    R: BufRead,
    W: Write,
    X: Write,
{
    writeln!(out, "{BANNER}")?;
    let mut executed = 0usize;
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 || is_end_of_session(&line) {
            break;
        }
        let query = line.trim();
        let mut sink = CsvSink::new(
            io_utils::csv_writer(&mut out, output.delimiter, output.output_encoding),
            output.encoding,
        );
        let outcome = session.query(query, &mut sink).and_then(|_| sink.flush());
        drop(sink);
        match outcome {
            Ok(()) => executed += 1,
            Err(e) if e.is_engine() => writeln!(err, "{e}")?,
            Err(e) => return Err(e),
        }
    }
    writeln!(out)?;
    out.flush()?;
    Ok(executed)
}
