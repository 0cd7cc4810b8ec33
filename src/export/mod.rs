//! File formats for tables and reports.
//!
//! - `csv`: load/save tables (header row required)
//! - `json`: array-of-records export
//! - `pdf`: plain paginated text documents

pub mod csv;
pub mod json;
pub mod pdf;

pub use self::csv::CsvCodec;
pub use self::json::JsonExporter;
pub use self::pdf::PdfDocument;
