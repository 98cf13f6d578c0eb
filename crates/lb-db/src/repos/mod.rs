//! Store operations, one module per table.

pub mod packages;
pub mod settings;
