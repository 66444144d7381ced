//! Core library for the sheet-cleanup command line application.
//!
//! The library loads one worksheet, fills its blank cells, styles the header
//! row, sizes every column to its content and writes a cleaned report. IO
//! adapters live under [`io`], the in-memory sheet in [`model`], the cleanup
//! pass in [`clean`], styling and widths in [`style`], and the orchestration
//! in [`report`].

pub mod clean;
pub mod error;
pub mod io;
pub mod model;
pub mod report;
pub mod style;
pub mod summary;

pub use error::{Result, ToolError};
