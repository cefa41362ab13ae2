//! Plain-text export of a model curve.
//!
//! ```text
//! # trmc microwave cavity model
//! # frequency in GHz
//! # d1 = 35.825, fixed = true
//! # copper_S = 55000000.0, fixed = true
//! # loss_fac = 1e-07, fixed = false
//! ...
//! 8.4 0.996035
//! ```

use ndarray::Array1;
use std::fmt::Write as _;
use std::io::Write;

use crate::error::{Result, TrmcError};
use crate::parameters::ParameterList;

/// Significant digits of the exported numbers.
pub const EXPORT_DIGITS: usize = 6;

/// Format `value` with `digits` significant digits in the style of C's `%g`.
///
/// Fixed notation is used for decimal exponents from -4 up to `digits - 1`,
/// scientific notation otherwise. Trailing zeros are removed.
///
/// # Examples
///
/// ```
/// use trmc_rs::io::format_significant;
///
/// assert_eq!(format_significant(8.4, 6), "8.4");
/// assert_eq!(format_significant(0.753312345, 6), "0.753312");
/// assert_eq!(format_significant(1e-7, 6), "1e-07");
/// assert_eq!(format_significant(5.5e7, 6), "5.5e+07");
/// ```
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let digits = digits.max(1);
    // rounding can carry into the next decade, so read the exponent back
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// Shortest text that reads back as exactly `value`.
///
/// Scientific notation is used for decimal exponents below -4 or from 16 on,
/// fixed notation with at least one decimal otherwise.
///
/// # Examples
///
/// ```
/// use trmc_rs::io::format_round_trip;
///
/// assert_eq!(format_round_trip(35.825), "35.825");
/// assert_eq!(format_round_trip(5.5e7), "55000000.0");
/// assert_eq!(format_round_trip(1e-7), "1e-07");
/// ```
pub fn format_round_trip(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if value != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let fixed = value.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            fixed + ".0"
        }
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Export text for the curve `(x, y)` computed with `params`.
pub fn export_text(params: &ParameterList, x: &Array1<f64>, y: &Array1<f64>) -> Result<String> {
    if x.len() != y.len() {
        return Err(TrmcError::DimensionMismatch(format!(
            "x has {} values, y has {}",
            x.len(),
            y.len()
        )));
    }

    let mut s = String::new();
    // writing to a String cannot fail
    let _ = writeln!(s, "# trmc microwave cavity model");
    let _ = writeln!(s, "# frequency in GHz");
    for p in params.iter() {
        let _ = writeln!(
            s,
            "# {} = {}, fixed = {}",
            p.name(),
            format_round_trip(p.value()),
            p.is_fixed()
        );
    }
    for (xv, yv) in x.iter().zip(y.iter()) {
        let _ = writeln!(
            s,
            "{} {}",
            format_significant(*xv, EXPORT_DIGITS),
            format_significant(*yv, EXPORT_DIGITS)
        );
    }
    Ok(s)
}

/// Write the export text to `writer`.
pub fn write_export<W: Write>(
    mut writer: W,
    params: &ParameterList,
    x: &Array1<f64>,
    y: &Array1<f64>,
) -> Result<()> {
    writer.write_all(export_text(params, x, y)?.as_bytes())?;
    writer.flush()?;
    Ok(())
}
