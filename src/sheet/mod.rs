//! Spreadsheet import and export (`.xlsx` only)

pub mod reader;
pub mod writer;

pub use reader::{AttendeeImport, read_rows};
pub use writer::{write_preview, write_template, write_views};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
