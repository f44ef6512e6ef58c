//! CLI interface for counting LTA geometry
use std::path::Path;

use crate::formats::lta::{lta_stats, read_lta};

/// Run `stats`.
///
/// # Errors
/// Returns an error if the file cannot be read or is not balanced LTA.
pub fn execute(lta: &Path, json: bool) -> anyhow::Result<()> {
    let nodes = read_lta(lta)?;
    let stats = lta_stats(&nodes);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", lta.display());
    println!("  Polyhedra:     {}", stats.polyhedra);
    println!("  Points:        {}", stats.points);
    println!("  Polygons:      {}", stats.polygons);
    println!("  Triangles:     {}", stats.triangles);
    println!("  Texture infos: {}", stats.texture_infos);
    println!("  World nodes:   {}", stats.world_nodes);
    println!("  Prop lists:    {}", stats.proplists);
    Ok(())
}
