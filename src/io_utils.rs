//! I/O utilities for CSV reading, writing, encoding, and delimiter resolution.
//!
//! All file I/O in csvquery flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding and output transcoding via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **Reader/writer construction**: `open_csv_reader`, `open_csv_writer`.
//!   Readers are flexible so truncated rows reach the loader's padding policy.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(value.to_string()))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Builds a reader that yields the header as an ordinary first record.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    Ok(open_csv_reader(reader, delimiter))
}

/// Size of the input in bytes, when it is a regular file.
pub fn input_size(path: &Path) -> Option<u64> {
    if is_dash(path) {
        return None;
    }
    std::fs::metadata(path).ok().map(|meta| meta.len())
}

pub fn open_csv_writer(
    path: Option<&Path>,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(File::create(p)?)),
        _ => Box::new(std::io::stdout()),
    };
    Ok(csv_writer(base, delimiter, encoding))
}

pub fn csv_writer<'w, W>(
    base: W,
    delimiter: u8,
    encoding: &'static Encoding,
) -> csv::Writer<Box<dyn Write + 'w>>
where
    W: Write + 'w,
{
    let writer: Box<dyn Write + 'w> = if encoding == UTF_8 {
        Box::new(base)
    } else {
        Box::new(TranscodingWriter::new(base, encoding))
    };

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    builder.from_writer(writer)
}

/// Strict decode: `None` when the bytes are not valid in `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Header cells decode with replacement characters rather than failing.
pub fn decode_header(record: &csv::ByteRecord, encoding: &'static Encoding) -> Vec<String> {
    record
        .iter()
        .map(|field| {
            let (text, _) = encoding.decode_with_bom_removal(field);
            text.trim().to_string()
        })
        .collect()
}

struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    buffer: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            buffer: Vec::new(),
        }
    }

    fn flush_buffer(&mut self, force: bool) -> io::Result<()> {
        match std::str::from_utf8(&self.buffer) {
            Ok(valid) => {
                let text = valid.to_owned();
                self.encode_and_write(&text)?;
                self.buffer.clear();
                Ok(())
            }
            Err(err) => {
                if let Some(error_len) = err.error_len() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Invalid UTF-8 sequence in output stream ({error_len} bytes)"),
                    ));
                }
                let valid_up_to = err.valid_up_to();
                if valid_up_to > 0 {
                    let text = String::from_utf8_lossy(&self.buffer[..valid_up_to]).into_owned();
                    self.encode_and_write(&text)?;
                    self.buffer.drain(..valid_up_to);
                }
                if force && !self.buffer.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "Incomplete UTF-8 sequence at end of output stream",
                    ));
                }
                Ok(())
            }
        }
    }

    fn encode_and_write(&mut self, text: &str) -> io::Result<()> {
        let (encoded, _output_encoding, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to encode text using {}", self.encoding.name()),
            ));
        }
        self.inner.write_all(encoded.as_ref())
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.flush_buffer(false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer(true)?;
        self.inner.flush()
    }
}
