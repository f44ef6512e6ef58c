//! File format handlers for LithTech Jupiter worlds
//!
//! `dat` decodes compiled worlds, `lta` models and writes the editable text
//! format, `dtx` reads texture dimensions.

pub mod common;
pub mod dat;
pub mod dtx;
pub mod lta;

// Re-export main document types
pub use common::hash_name_ic;
pub use dat::{VertexLayout, WorldGraph, parse_dat_bytes, read_dat};
pub use dtx::TextureSizes;
pub use lta::{LtaWorld, parse_lta, read_lta, serialize_lta, write_lta};
