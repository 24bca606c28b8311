//! Candidate column types and sample-based type guessing.
//!
//! A column's type is the first entry of [`CANDIDATES`] whose parse function
//! accepts every sampled value. Integer precedes Float because every integer
//! literal is also a float literal; Text and Blob accept (almost) anything and
//! act as the fallback.

use std::fmt;

use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::{data::Value, io_utils};

/// Formatting characters dropped from both ends of a numeric cell.
const NUMERIC_STRIP_CHARS: [char; 3] = ['%', '$', '?'];
const THOUSANDS_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateType {
    Integer,
    Float,
    Text,
    Blob,
}

/// Settings a parse function needs besides the raw cell.
#[derive(Debug, Clone, Copy)]
pub struct Cast<'a> {
    pub encoding: &'static Encoding,
    pub null_token: &'a str,
}

impl Default for Cast<'_> {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            null_token: "",
        }
    }
}

pub type ParseFn = fn(&[u8], &Cast<'_>) -> Option<Value>;

/// One row of the cast table.
#[derive(Clone, Copy)]
pub struct Candidate {
    pub datatype: CandidateType,
    pub parse: ParseFn,
    pub sql_type: &'static str,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("datatype", &self.datatype)
            .field("sql_type", &self.sql_type)
            .finish()
    }
}

pub static CANDIDATES: [Candidate; 4] = [
    Candidate {
        datatype: CandidateType::Integer,
        parse: parse_integer,
        sql_type: "INTEGER",
    },
    Candidate {
        datatype: CandidateType::Float,
        parse: parse_float,
        sql_type: "FLOAT",
    },
    Candidate {
        datatype: CandidateType::Text,
        parse: parse_text,
        sql_type: "TEXT",
    },
    Candidate {
        datatype: CandidateType::Blob,
        parse: parse_blob,
        sql_type: "BLOB",
    },
];

impl CandidateType {
    pub fn candidate(self) -> &'static Candidate {
        match self {
            CandidateType::Integer => &CANDIDATES[0],
            CandidateType::Float => &CANDIDATES[1],
            CandidateType::Text => &CANDIDATES[2],
            CandidateType::Blob => &CANDIDATES[3],
        }
    }

    pub fn sql_type(self) -> &'static str {
        self.candidate().sql_type
    }

    pub fn parse(self, raw: &[u8], cast: &Cast<'_>) -> Option<Value> {
        (self.candidate().parse)(raw, cast)
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// Removes `%`, `$`, `?` from both ends and every thousands separator.
pub fn strip_numeric_formatting(text: &str) -> String {
    text.trim_matches(NUMERIC_STRIP_CHARS)
        .replace(THOUSANDS_SEPARATOR, "")
        .trim()
        .to_string()
}

enum NumericCell {
    Null,
    Digits(String),
}

fn numeric_cell(raw: &[u8], cast: &Cast<'_>) -> Option<NumericCell> {
    let text = io_utils::decode_bytes(raw, cast.encoding)?;
    if text == cast.null_token {
        return Some(NumericCell::Null);
    }
    Some(NumericCell::Digits(strip_numeric_formatting(&text)))
}

fn parse_integer(raw: &[u8], cast: &Cast<'_>) -> Option<Value> {
    match numeric_cell(raw, cast)? {
        NumericCell::Null => Some(Value::Null),
        NumericCell::Digits(text) => text.parse::<i64>().ok().map(Value::Integer),
    }
}

fn parse_float(raw: &[u8], cast: &Cast<'_>) -> Option<Value> {
    match numeric_cell(raw, cast)? {
        NumericCell::Null => Some(Value::Null),
        NumericCell::Digits(text) => text.parse::<f64>().ok().map(Value::Float),
    }
}

fn parse_text(raw: &[u8], cast: &Cast<'_>) -> Option<Value> {
    io_utils::decode_bytes(raw, cast.encoding).map(Value::Text)
}

fn parse_blob(raw: &[u8], _cast: &Cast<'_>) -> Option<Value> {
    Some(Value::Blob(raw.to_vec()))
}

/// First type in [`CANDIDATES`] that parses every sampled value.
pub fn guess_type<S>(sample: &[S], cast: &Cast<'_>) -> Option<CandidateType>
where
    S: AsRef<[u8]>,
{
    guess_type_from(&CANDIDATES, sample, cast)
}

pub fn guess_type_from<S>(
    candidates: &[Candidate],
    sample: &[S],
    cast: &Cast<'_>,
) -> Option<CandidateType>
where
    S: AsRef<[u8]>,
{
    candidates
        .iter()
        .find(|candidate| {
            sample
                .iter()
                .all(|value| (candidate.parse)(value.as_ref(), cast).is_some())
        })
        .map(|candidate| candidate.datatype)
}
