//! Command execution implementations

use super::Commands;
use super::{convert, inspect, stats};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                dat,
                layout,
                textures,
                output_dir,
                quiet,
            } => convert::execute(dat, layout, textures, output_dir.as_deref(), *quiet),
            Commands::Inspect { dat, layout, json } => inspect::execute(dat, layout, *json),
            Commands::Stats { lta, json } => stats::execute(lta, *json),
        }
    }
}
