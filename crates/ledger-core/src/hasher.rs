//! Content hashing over an arbitrary tuple of serializable values.
//!
//! Every argument is rendered to canonical JSON on its own, the renderings are
//! sorted lexicographically and concatenated, and the concatenation is digested
//! with SHA-256. Sorting makes the digest depend on the multiset of arguments
//! only, never on the order they were passed in.
//!
//! The canonical JSON layout uses `", "` and `": "` separators, escapes
//! every non-ASCII character as `\uXXXX` and prints floats in shortest
//! round-trip form (`1e+16`, `1000000000000000.0`, `1e-05`), so digests match
//! peers that hash with the same conventions byte for byte. Integers outside
//! the 64-bit range are parsed as floats and do not survive that round trip.

use crate::error::Result;
use serde::Serialize;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};
use std::io::{self, Write};

/// Digest any number of serializable values, e.g. `crypto_hash!(1, "two", [3])`.
///
/// Expands to a `ledger_core::error::Result<String>`.
#[macro_export]
macro_rules! crypto_hash {
    ($($arg:expr),+ $(,)?) => {
        $crate::hasher::try_digest([$($crate::hasher::stringify(&$arg)),+])
    };
}

/// JSON formatter producing the canonical argument rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&bytes[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }
}

/// Shortest round-trip rendering of a finite float.
///
/// Positional notation while the decimal point falls within 16 digits of
/// the first significant one, otherwise `d.ddde±XX` with a two-digit minimum
/// exponent. Positional values always carry a fractional part.
fn format_float(value: f64) -> String {
    // `{:e}` yields the shortest digits that round-trip, e.g. `-1.25e-7`.
    let sci = format!("{:e}", value.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let n = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exp + 1;

    let mut out = String::with_capacity(digits.len() + 8);
    if value.is_sign_negative() {
        out.push('-');
    }
    if point <= -4 || point > 16 {
        out.push_str(&digits[..1]);
        if n > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let shown = point - 1;
        out.push_str(if shown < 0 { "e-" } else { "e+" });
        out.push_str(&format!("{:02}", shown.abs()));
    } else if point <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat(point.unsigned_abs() as usize));
        out.push_str(&digits);
    } else if point >= n {
        out.push_str(&digits);
        out.push_str(&"0".repeat((point - n) as usize));
        out.push_str(".0");
    } else {
        let (int, frac) = digits.split_at(point as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Render one hash argument in canonical form.
pub fn stringify<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::with_capacity(64);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value.serialize(&mut ser)?;
    // The formatter only ever emits ASCII.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Sort, concatenate and digest already rendered arguments.
pub fn digest_parts(mut parts: Vec<String>) -> String {
    parts.sort_unstable();
    let mut hasher = Sha256::new();
    for part in &parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Like [`digest_parts`] but takes renderings that may have failed.
pub fn try_digest<I>(parts: I) -> Result<String>
where
    I: IntoIterator<Item = Result<String>>,
{
    let parts = parts.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(digest_parts(parts))
}
