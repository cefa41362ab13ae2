//! # Data Import and Export
//!
//! Reading measured reflection spectra from column-oriented text files and
//! writing model curves back out.

mod export;
mod textdata;

pub use export::{export_text, format_round_trip, format_significant, write_export, EXPORT_DIGITS};
pub use textdata::{parse_textdata, read_textdata, read_textdata_file, TextData, TextDataOptions};
