use clap::Subcommand;
use std::path::PathBuf;

pub mod convert;
pub mod execute;
pub mod inspect;
pub mod stats;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a DAT world into <map>.lta, <map>_PhysicsDATA.lta and <map>.txt
    Convert {
        /// Source DAT file
        dat: PathBuf,

        /// Render vertex layout: v1 (with tangents) or v2 (compact)
        layout: String,

        /// Game resource directory texture names are resolved against
        #[arg(long, default_value = ".")]
        textures: PathBuf,

        /// Output directory (defaults to the DAT file's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Decode a DAT file and print a section summary
    Inspect {
        /// Source DAT file
        dat: PathBuf,

        /// Render vertex layout: v1 (with tangents) or v2 (compact)
        layout: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count polyhedra, points and triangles of an LTA file
    Stats {
        /// LTA file
        lta: PathBuf,

        /// Print the counts as JSON
        #[arg(long)]
        json: bool,
    },
}
