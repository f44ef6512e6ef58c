//! CLI interface for decoding a DAT file without writing anything
use std::path::Path;

use crate::formats::{VertexLayout, read_dat};

/// Run `inspect`.
///
/// # Errors
/// Returns an error for a bad layout selector or a file that does not decode.
pub fn execute(dat: &Path, layout: &str, json: bool) -> anyhow::Result<()> {
    let layout: VertexLayout = layout.parse()?;
    let graph = read_dat(dat, layout)?;
    let summary = graph.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", dat.display());
    println!("  Version:              {}", summary.version);
    println!("  Info:                 {}", summary.info_string);
    println!("  World models:         {}", summary.world_models);
    println!(
        "  Layout nodes:         {} branches, {} leaves",
        summary.layout_branches, summary.layout_leaves
    );
    println!("  Brushes:              {}", summary.brushes);
    println!("  Objects:              {}", summary.objects);
    println!("  Blind objects:        {}", summary.blind_objects);
    println!("  Collision polygons:   {}", summary.collision_polygons);
    println!("  Particle blockers:    {}", summary.particle_blockers);
    println!("  Render nodes:         {}", summary.render_nodes);
    println!("  World model nodes:    {}", summary.world_model_nodes);
    println!("  Sections:             {}", summary.sections);
    println!("  Vertices:             {}", summary.vertices);
    println!("  Triangles:            {}", summary.triangles);
    println!("  Sky portals:          {}", summary.sky_portals);
    println!("  Occluders:            {}", summary.occluders);
    println!("  Light groups:         {}", summary.light_groups);
    println!("  World light groups:   {}", summary.world_light_groups);
    println!("  FX bindings:          {}", summary.fx_bindings);
    Ok(())
}
