//! LithTech text world (LTA) format module
//!
//! Scene model, serializer and a small parser used to inspect written files.

mod document;
mod reader;
mod writer;

// Public API
pub use document::{
    EditPoly, LtaWorld, NodeKind, PolyTextures, Polyhedron, PropData, PropEntry, PropList,
    TextureInfo, WorldNode,
};
pub use reader::{LtaNode, LtaStats, lta_stats, parse_lta, read_lta};
pub use writer::{LtaWriter, fmt_vec3, quoted, serialize_lta, write_lta};
