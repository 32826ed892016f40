//! Delimited text → labeled vectors.
//!
//! One vector per non-blank line. The label sits in the first or last
//! remaining column; every other remaining column is a feature.

use std::io::BufRead;
use std::str::FromStr;

use rhc_core::LabeledVector;
use tracing::debug;

use crate::error::{DataError, Result};

/// Which column holds the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelColumn {
    First,
    #[default]
    Last,
}

/// Converts one raw field into a value; `None` marks the field unparseable.
pub trait ValueConverter<T> {
    fn convert(&self, value: &str) -> Option<T>;
}

/// Converter backed by [`FromStr`] on the trimmed field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseConverter;

impl<T: FromStr> ValueConverter<T> for ParseConverter {
    fn convert(&self, value: &str) -> Option<T> {
        value.trim().parse().ok()
    }
}

impl<T, F> ValueConverter<T> for F
where
    F: Fn(&str) -> Option<T>,
{
    fn convert(&self, value: &str) -> Option<T> {
        self(value)
    }
}

type Preprocessor = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builder-style reader configuration.
///
/// ```
/// use rhc_data::{Importer, LabelColumn};
///
/// let csv = "sepal,petal,class\n5.1,1.4,setosa\n7.0,4.7,versicolor\n";
/// let vectors = Importer::new()
///     .skip_rows(1)
///     .label_column(LabelColumn::Last)
///     .import::<String, _>(csv.as_bytes())
///     .unwrap();
/// assert_eq!(vectors.len(), 2);
/// assert_eq!(vectors[1].label, "versicolor");
/// ```
pub struct Importer {
    delimiter: String,
    skip_rows: usize,
    label_column: LabelColumn,
    discard_columns: Vec<usize>,
    preprocess: Option<Preprocessor>,
}

impl Default for Importer {
    fn default() -> Self {
        Importer {
            delimiter: ",".to_string(),
            skip_rows: 0,
            label_column: LabelColumn::Last,
            discard_columns: Vec::new(),
            preprocess: None,
        }
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("delimiter", &self.delimiter)
            .field("skip_rows", &self.skip_rows)
            .field("label_column", &self.label_column)
            .field("discard_columns", &self.discard_columns)
            .field("preprocess", &self.preprocess.is_some())
            .finish()
    }
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Lines dropped unread at the top (headers).
    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn label_column(mut self, column: LabelColumn) -> Self {
        self.label_column = column;
        self
    }

    /// 0-based raw columns ignored entirely (ids, timestamps, ...).
    pub fn discard_columns(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.discard_columns = columns.into_iter().collect();
        self
    }

    /// Rewrite each line before splitting; returning `None` skips the line.
    pub fn preprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.preprocess = Some(Box::new(f));
        self
    }

    /// Import with [`FromStr`] conversion for features and labels.
    pub fn import<L: FromStr, R: BufRead>(&self, reader: R) -> Result<Vec<LabeledVector<L>>> {
        self.import_with(reader, &ParseConverter, &ParseConverter)
    }

    /// Import with custom converters.
    pub fn import_with<L, R, F, C>(
        &self,
        reader: R,
        features: &F,
        labels: &C,
    ) -> Result<Vec<LabeledVector<L>>>
    where
        R: BufRead,
        F: ValueConverter<f64> + ?Sized,
        C: ValueConverter<L> + ?Sized,
    {
        let mut vectors = Vec::new();
        let mut rank: Option<usize> = None;

        for (index, line) in reader.lines().enumerate() {
            let raw = line?;
            let line_no = index + 1;
            if index < self.skip_rows {
                continue;
            }

            let line = match &self.preprocess {
                Some(f) => match f(&raw) {
                    Some(rewritten) => rewritten,
                    None => continue,
                },
                None => raw,
            };
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<(usize, &str)> = line
                .split(self.delimiter.as_str())
                .enumerate()
                .filter(|(column, _)| !self.discard_columns.contains(column))
                .collect();
            if fields.len() < 2 {
                return Err(DataError::format(
                    line_no,
                    format!("expected a label and at least one feature, found {} field(s)", fields.len()),
                ));
            }

            let (label_field, feature_fields) = match self.label_column {
                LabelColumn::First => (fields[0], &fields[1..]),
                LabelColumn::Last => (fields[fields.len() - 1], &fields[..fields.len() - 1]),
            };

            let label = labels
                .convert(label_field.1)
                .ok_or_else(|| parse_error(line_no, label_field))?;
            let values = feature_fields
                .iter()
                .map(|&field| features.convert(field.1).ok_or_else(|| parse_error(line_no, field)))
                .collect::<Result<Vec<f64>>>()?;

            match rank {
                None => rank = Some(values.len()),
                Some(r) if r != values.len() => {
                    return Err(DataError::format(
                        line_no,
                        format!("expected {r} features, found {}", values.len()),
                    ));
                }
                Some(_) => {}
            }
            vectors.push(LabeledVector::new(label, values));
        }

        debug!(vectors = vectors.len(), rank = rank.unwrap_or(0), "imported");
        Ok(vectors)
    }
}

fn parse_error(line: usize, (column, value): (usize, &str)) -> DataError {
    DataError::Parse {
        line,
        column: column + 1,
        value: value.to_string(),
    }
}
