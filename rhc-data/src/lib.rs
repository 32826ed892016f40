//! # rhc-data
//!
//! Getting labeled vectors in and out of the classifier:
//!
//! - **Importer**: delimited text with configurable delimiter, header rows,
//!   label column, discarded columns, line preprocessing and converters
//! - **Exporter**: the inverse, `features...,label` per line
//! - **Partitioner**: cyclic, equal-size and seeded random splits
//! - **Transformer**: dense feature/label matrices with a label index

pub mod error;
pub mod exporter;
pub mod importer;
pub mod partitioner;
pub mod transformer;

pub use error::{DataError, Result};
pub use exporter::export;
pub use importer::{Importer, LabelColumn, ParseConverter, ValueConverter};
pub use partitioner::{equal_partition, partition, random_partition};
pub use transformer::{transform, transform_with_one_label, Transformed};
