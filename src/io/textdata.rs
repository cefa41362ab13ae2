//! Reader for tabulated ASCII data.
//!
//! Accepts most column-oriented text exports: values separated by runs of
//! whitespace, `,` or `;`, preceded by an arbitrary header. The numeric block
//! starts at the first line that begins with a digit or sign and parses
//! completely. It ends at the first line with a different column count or
//! with something that is not a number.

use ndarray::{Array1, Array2};
use nom::{
    bytes::complete::{take_while, take_while1},
    combinator::eof,
    multi::separated_list1,
    number::complete::double,
    sequence::delimited,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TrmcError};

const NUMBER_START: &str = "0123456789+-";

/// Options for [`read_textdata`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDataOptions {
    /// Treat `,` as the decimal separator. Columns are then separated by
    /// whitespace and `;` only.
    pub decimal_comma: bool,
}

/// Numeric block and header of a text file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextData {
    /// Rows of the numeric block, all with `columns` values
    pub data: Vec<Vec<f64>>,

    /// Lines skipped before the numeric block, without line terminators
    pub header: Vec<String>,

    /// Number of columns, 0 if no numeric row was found
    pub columns: usize,

    /// Zero-based line index of the first numeric row
    pub first_line: Option<usize>,
}

impl TextData {
    pub fn rows(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The numeric block as a `rows x columns` array.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows(), self.columns), |(i, j)| self.data[i][j])
    }

    pub fn column(&self, j: usize) -> Option<Array1<f64>> {
        if j >= self.columns {
            return None;
        }
        Some(self.data.iter().map(|row| row[j]).collect())
    }

    /// The first two columns as `(x, y)`.
    pub fn xy(&self) -> Result<(Array1<f64>, Array1<f64>)> {
        match (self.column(0), self.column(1)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(TrmcError::Parse {
                line: self.first_line.map_or(0, |l| l + 1),
                message: format!(
                    "need at least two numeric columns, found {}",
                    self.columns
                ),
            }),
        }
    }
}

fn is_separator(c: char, decimal_comma: bool) -> bool {
    c.is_whitespace() || c == ';' || (c == ',' && !decimal_comma)
}

/// A complete line of numbers, nothing else.
fn numbers(input: &str, decimal_comma: bool) -> IResult<&str, Vec<f64>> {
    let sep = move |c: char| is_separator(c, decimal_comma);
    delimited(
        take_while(sep),
        separated_list1(take_while1(sep), double),
        (take_while(sep), eof),
    )
    .parse(input)
}

/// Numeric values of `line`, or `None` if it is not a pure number row.
fn parse_row(line: &str, options: &TextDataOptions) -> Option<Vec<f64>> {
    if options.decimal_comma {
        let line = line.replace(',', ".");
        numbers(&line, true).ok().map(|(_, values)| values)
    } else {
        numbers(line, false).ok().map(|(_, values)| values)
    }
}

/// Parse tabulated data from a string.
///
/// # Examples
///
/// ```
/// use trmc_rs::io::{parse_textdata, TextDataOptions};
///
/// let text = "frequency reflection\n8.40, 0.98\n8.41, 0.97\n\n8.42, 0.95\nend\n";
/// let data = parse_textdata(text, &TextDataOptions::default());
/// assert_eq!(data.header, vec!["frequency reflection"]);
/// assert_eq!(data.rows(), 3);
/// assert_eq!(data.data[2], vec![8.42, 0.95]);
/// ```
pub fn parse_textdata(text: &str, options: &TextDataOptions) -> TextData {
    let mut data = TextData::default();
    for (k, line) in text.lines().enumerate() {
        if !accept_line(&mut data, k, line, options) {
            break;
        }
    }
    finish(data)
}

/// Read tabulated data from a buffered reader.
pub fn read_textdata<R: BufRead>(reader: R, options: &TextDataOptions) -> Result<TextData> {
    let mut data = TextData::default();
    for (k, line) in reader.lines().enumerate() {
        let line = line?;
        if !accept_line(&mut data, k, &line, options) {
            break;
        }
    }
    Ok(finish(data))
}

/// Read tabulated data from a file.
pub fn read_textdata_file<P: AsRef<Path>>(path: P, options: &TextDataOptions) -> Result<TextData> {
    let file = File::open(path.as_ref())?;
    debug!(path = %path.as_ref().display(), "reading text data");
    read_textdata(BufReader::new(file), options)
}

/// Feed one line into `data`. Returns `false` once the numeric block has ended.
fn accept_line(data: &mut TextData, k: usize, line: &str, options: &TextDataOptions) -> bool {
    let trimmed = line.trim_start();
    let started = data.first_line.is_some();
    let first = match trimmed.chars().next() {
        Some(c) => c,
        None => return true,
    };

    let row = if NUMBER_START.contains(first) {
        parse_row(trimmed, options)
    } else {
        None
    };

    match (row, started) {
        (Some(values), false) => {
            data.columns = values.len();
            data.first_line = Some(k);
            data.data.push(values);
            true
        }
        (Some(values), true) if values.len() == data.columns => {
            data.data.push(values);
            true
        }
        (None, false) => {
            data.header
                .push(line.trim_end_matches(['\r', '\n']).to_string());
            true
        }
        _ => false,
    }
}

fn finish(data: TextData) -> TextData {
    debug!(
        rows = data.rows(),
        columns = data.columns,
        header_lines = data.header.len(),
        "text data parsed"
    );
    data
}
