//! # dat2lta
//!
//! A pure-Rust converter from LithTech Jupiter (version 85) compiled world
//! files (DAT) back into editable LTA projects.
//!
//! ## Outputs
//!
//! - **`<map>.lta`** - every render section as a textured brush, placed
//!   objects, world models, sky portals, occluders and blockers
//! - **`<map>_PhysicsDATA.lta`** - the world tree brushes, untextured
//! - **`<map>.txt`** - a dump of every decoded section
//!
//! ## Quick Start
//!
//! ### Converting a world
//!
//! ```no_run
//! use dat2lta::converter::{ConvertOptions, convert_dat_to_lta};
//! use dat2lta::formats::VertexLayout;
//!
//! let options = ConvertOptions::new(VertexLayout::Compact).with_texture_root("Game");
//! let report = convert_dat_to_lta("Worlds/level01.dat", &options)?;
//! println!("Wrote {}", report.main_lta.display());
//! # Ok::<(), dat2lta::Error>(())
//! ```
//!
//! ### Decoding only
//!
//! ```no_run
//! use dat2lta::prelude::*;
//!
//! let layout: VertexLayout = "v1".parse()?;
//! let graph = read_dat("Worlds/level01.dat", layout)?;
//! println!("{} render nodes", graph.render_nodes.len());
//! # Ok::<(), dat2lta::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `dat2lta` command-line binary

pub mod error;
pub mod formats;
pub mod converter;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::dat::{VertexLayout, WorldGraph, parse_dat_bytes, read_dat};
    pub use crate::formats::lta::{LtaWorld, lta_stats, read_lta, serialize_lta, write_lta};

    pub use crate::converter;
    pub use crate::converter::{ConversionReport, ConvertOptions, convert_dat_to_lta};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
