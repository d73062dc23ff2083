//! In-memory result tables.
//!
//! A [`Table`] is a row-oriented dataset with named columns. Rows are read
//! through [`Row`] views, which is what classification functions and chart
//! builders receive.

mod csv_io;
mod frame;
mod value;

pub use frame::{Row, Table};
pub use value::Value;
