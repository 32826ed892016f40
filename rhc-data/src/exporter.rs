//! Labeled vectors → delimited text, one `features...,label` line each.
//!
//! `f64` is written with its shortest round-trip representation, so the
//! output imports back bit-for-bit with the default [`Importer`](crate::Importer).

use std::fmt::Display;
use std::io::Write;

use rhc_core::LabeledVector;

use crate::error::Result;

/// Write `vectors` to `writer` and return the number of lines written.
pub fn export<L: Display, W: Write>(
    vectors: &[LabeledVector<L>],
    writer: &mut W,
    separator: &str,
) -> Result<usize> {
    for v in vectors {
        for x in v.features() {
            write!(writer, "{x}{separator}")?;
        }
        writeln!(writer, "{}", v.label)?;
    }
    writer.flush()?;
    Ok(vectors.len())
}
