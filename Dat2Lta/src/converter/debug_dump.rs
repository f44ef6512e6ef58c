//! Plain-text dump of a decoded world
//!
//! Every section is listed with its counts and records so decode anomalies
//! can be spotted without an LTA viewer. The output is not meant to be
//! parsed back.

use crate::error::Result;
use crate::formats::dat::{
    BlindObject, BlockerPolygon, LayoutNode, PropertyBag, PropertyValue, RenderNode, WorldGraph,
    render_section_label, shader_debug_name,
};
use crate::formats::lta::fmt_vec3;
use std::fmt::Write;

/// Render the debug dump of `graph`.
///
/// # Errors
/// Returns an error if formatting into the output buffer fails.
pub fn debug_dump(graph: &WorldGraph) -> Result<String> {
    let mut out = String::new();
    dump_header(&mut out, graph)?;
    dump_world_tree(&mut out, graph)?;
    dump_objects(&mut out, graph)?;
    dump_blind_objects(&mut out, graph)?;
    dump_blockers(&mut out, "Collision polygons", &graph.collision)?;
    dump_blockers(&mut out, "Particle blockers", &graph.particle_blockers)?;

    writeln!(out, "== Render nodes ({}) ==", graph.render_nodes.len())?;
    for (index, node) in graph.render_nodes.iter().enumerate() {
        dump_render_node(&mut out, &format!("RenderNode {index}"), node, Some(index))?;
    }

    writeln!(out, "== World model nodes ({}) ==", graph.world_model_nodes.len())?;
    for wm in &graph.world_model_nodes {
        writeln!(out, "WorldModel {} (no_child_flag {})", wm.name, wm.no_child_flag)?;
        for (sub, node) in wm.nodes.iter().enumerate() {
            dump_render_node(&mut out, &format!("  {}[{sub}]", wm.name), node, None)?;
        }
    }

    writeln!(out, "== World light groups ({}) ==", graph.world_light_groups.len())?;
    for group in &graph.world_light_groups {
        writeln!(
            out,
            "{} color ({}) offset {:?} size {:?} data {} bytes",
            group.name,
            fmt_vec3(group.color),
            group.offset,
            group.size,
            group.data.len()
        )?;
    }

    writeln!(out, "== FX bindings ({}) ==", graph.fx_bindings.len())?;
    for fx in &graph.fx_bindings {
        writeln!(out, "{} -> {} at ({})", fx.effect, fx.owner, fmt_vec3(fx.position))?;
    }
    Ok(out)
}

fn dump_header(out: &mut String, graph: &WorldGraph) -> Result<()> {
    let h = &graph.header;
    writeln!(out, "== Header ==")?;
    writeln!(out, "version {}", h.version)?;
    writeln!(out, "objects @ {}", h.object_data_pos)?;
    writeln!(out, "blind objects @ {}", h.blind_object_data_pos)?;
    writeln!(out, "light grid @ {}", h.lightgrid_pos)?;
    writeln!(out, "collision @ {}", h.collision_data_pos)?;
    writeln!(out, "particle blockers @ {}", h.particle_blocker_data_pos)?;
    writeln!(out, "render data @ {}", h.render_data_pos)?;
    writeln!(out, "packer {} v{}", h.packer_type, h.packer_version)?;

    let info = &graph.info;
    writeln!(out, "== World info ==")?;
    writeln!(out, "info \"{}\"", info.info_string)?;
    writeln!(out, "extents ({}) - ({})", fmt_vec3(info.extents_min), fmt_vec3(info.extents_max))?;
    writeln!(out, "offset ({})", fmt_vec3(info.offset))?;
    Ok(())
}

fn dump_world_tree(out: &mut String, graph: &WorldGraph) -> Result<()> {
    let tree = &graph.tree;
    writeln!(out, "== World tree ==")?;
    writeln!(out, "bbox ({}) - ({})", fmt_vec3(tree.bbox_min), fmt_vec3(tree.bbox_max))?;
    writeln!(out, "sub nodes {} terrain depth {}", tree.sub_node_count, tree.terrain_depth)?;

    let mut drawing = String::new();
    tree.walk_layout(|path, node| {
        draw_layout_line(&mut drawing, path, node);
    });
    out.push_str(&drawing);

    writeln!(out, "-- World models ({}) --", tree.world_models.len())?;
    for (index, model) in tree.world_models.iter().enumerate() {
        writeln!(
            out,
            "[{index}] {} points {} planes {} surfaces {} polygons {} nodes {} root {}",
            model.name,
            model.points.len(),
            model.planes.len(),
            model.surfaces.len(),
            model.polygons.len(),
            model.nodes.len(),
            model.root_node
        )?;
        for (surface_index, surface) in model.surfaces.iter().enumerate() {
            writeln!(
                out,
                "    surface {surface_index}: {} texture {} ({}) [{}]",
                surface.flags.0,
                surface.texture_index,
                model.texture_name(surface_index).unwrap_or("?"),
                surface.flags
            )?;
        }
    }

    writeln!(out, "-- Brushes ({}) --", graph.brushes.len())?;
    for brush in &graph.brushes {
        writeln!(
            out,
            "wm {} surface {} polygons {} texture {}",
            brush.world_model,
            brush.surface,
            brush.polygons.len(),
            brush.texture
        )?;
    }
    Ok(())
}

/// One line of the layout drawing: ancestors' connectors, then this node's.
fn draw_layout_line(out: &mut String, path: &[bool], node: LayoutNode) {
    let Some((&last, ancestors)) = path.split_last() else {
        return;
    };
    // The root has no connector of its own
    for &ancestor_last in ancestors.iter().skip(1) {
        out.push_str(if ancestor_last { "    " } else { "│   " });
    }
    if !ancestors.is_empty() {
        out.push_str(if last { "└── " } else { "├── " });
    }
    out.push_str(match node {
        LayoutNode::Branch => "Branch\n",
        LayoutNode::Leaf => "Leaf\n",
    });
}

fn dump_objects(out: &mut String, graph: &WorldGraph) -> Result<()> {
    writeln!(out, "== Objects ({}) ==", graph.objects.len())?;
    for object in &graph.objects {
        writeln!(out, "{} (size {})", object.type_name, object.declared_size)?;
        dump_properties(out, &object.properties, "    ")?;
    }
    Ok(())
}

fn dump_properties(out: &mut String, bag: &PropertyBag, indent: &str) -> Result<()> {
    for (name, property) in bag.iter() {
        writeln!(
            out,
            "{indent}{} {name} = {} (flags {:#x})",
            property.kind().lta_keyword(),
            format_value(&property.value),
            property.flags
        )?;
    }
    Ok(())
}

fn format_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => format!("\"{s}\""),
        PropertyValue::Vector(v) | PropertyValue::Color(v) => format!("({})", fmt_vec3(*v)),
        PropertyValue::Real(f) | PropertyValue::LongInt(f) => format!("{f:.6}"),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Rotation(q) => format!("({:.6} {:.6} {:.6} {:.6})", q.x, q.y, q.z, q.w),
        PropertyValue::Raw { data_type, bytes } => {
            format!("<type {data_type}, {} bytes>", bytes.len())
        }
    }
}

fn dump_blind_objects(out: &mut String, graph: &WorldGraph) -> Result<()> {
    writeln!(out, "== Blind objects ({}) ==", graph.blind_objects.len())?;
    for blind in &graph.blind_objects {
        match blind {
            BlindObject::KeyFramer(path) => {
                writeln!(out, "KeyFramer {} ({} keys)", path.name, path.keys.len())?;
                for key in &path.keys {
                    writeln!(
                        out,
                        "    {} type {} pos ({}) rot ({}) t {:.6} sound \"{}\" r {:.6} cmd \"{}\"",
                        key.name,
                        key.key_type,
                        fmt_vec3(key.position),
                        fmt_vec3(key.rotation),
                        key.timestamp,
                        key.sound_name,
                        key.sound_radius,
                        key.command
                    )?;
                    if let (Some(prev), Some(next)) = (key.bezier_prev, key.bezier_next) {
                        writeln!(out, "        bezier ({}) ({})", fmt_vec3(prev), fmt_vec3(next))?;
                    }
                }
            }
            BlindObject::Scatter { name, volumes } => {
                writeln!(out, "ScatterVolume {name} ({} volumes)", volumes.len())?;
                for volume in volumes {
                    writeln!(
                        out,
                        "    volume at ({}) dims ({}) particles {}",
                        fmt_vec3(volume.position),
                        fmt_vec3(volume.dimensions),
                        volume.particles.len()
                    )?;
                    for particle in &volume.particles {
                        writeln!(
                            out,
                            "        ({}) color {:#010x} scale {:.6} wave {} {}",
                            fmt_vec3(particle.position),
                            particle.color,
                            particle.scale,
                            particle.wave_rotation,
                            particle.wave_start
                        )?;
                    }
                }
            }
            BlindObject::Opaque { id, data } => {
                writeln!(out, "Unknown blind object {id} ({} bytes)", data.len())?;
            }
        }
    }
    Ok(())
}

fn dump_blockers(out: &mut String, title: &str, polygons: &[BlockerPolygon]) -> Result<()> {
    writeln!(out, "== {title} ({}) ==", polygons.len())?;
    for polygon in polygons {
        writeln!(
            out,
            "normal ({}) dist {:.6} vertices {}",
            fmt_vec3(polygon.normal),
            polygon.dist,
            polygon.vertices.len()
        )?;
    }
    Ok(())
}

fn dump_render_node(
    out: &mut String,
    title: &str,
    node: &RenderNode,
    top_level: Option<usize>,
) -> Result<()> {
    writeln!(
        out,
        "{title}: center ({}) half ({}) sections {} vertices {} triangles {} children {:?} flags {}",
        fmt_vec3(node.center),
        fmt_vec3(node.half_dims),
        node.sections.len(),
        node.vertices.len(),
        node.triangles.len(),
        node.children,
        node.child_flags
    )?;

    for (index, (section, tris)) in node.section_triangles().enumerate() {
        writeln!(
            out,
            "    section {index}: \"{}\" \"{}\" shader {} triangles {} effect \"{}\" lightmap {}x{} ({} bytes){}",
            section.texture0,
            section.texture1,
            shader_debug_name(section.shader),
            tris.len(),
            section.texture_effect,
            section.lightmap_width,
            section.lightmap_height,
            section.lightmap.len(),
            if section.is_light_anim() { " [skipped]" } else { "" }
        )?;
    }
    if let Some(node_index) = top_level {
        for (kept, _, _) in node.kept_sections() {
            writeln!(out, "    brush {}", render_section_label(node_index, kept))?;
        }
    }

    for portal in &node.sky_portals {
        writeln!(
            out,
            "    sky portal: {} vertices normal ({}) dist {:.6}",
            portal.vertices.len(),
            fmt_vec3(portal.normal),
            portal.dist
        )?;
    }
    for occluder in &node.occluders {
        let kind = occluder.kind.map_or_else(|| "unclassified".to_string(), |k| k.to_string());
        writeln!(
            out,
            "    occluder {:#010x} \"{}\" {kind}: {} vertices",
            occluder.hash,
            occluder.name,
            occluder.vertices.len()
        )?;
    }
    for group in &node.light_groups {
        writeln!(
            out,
            "    light group {} color ({}) intensity {} bytes sub-lightmaps {}",
            group.name,
            fmt_vec3(group.color),
            group.intensity.len(),
            group.section_lightmaps.iter().map(Vec::len).sum::<usize>()
        )?;
    }
    dump_properties(out, &node.properties, "    ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dat::{Occluder, OccluderKind, WorldTree};
    use glam::Vec3;

    #[test]
    fn test_layout_drawing() {
        let graph = WorldGraph {
            // branch, then leaves: bits 1,0,0,0,0
            tree: WorldTree {
                layout: vec![0b0000_0001],
                ..WorldTree::default()
            },
            ..WorldGraph::default()
        };
        let dump = debug_dump(&graph).unwrap();
        let expected = "Branch\n├── Leaf\n├── Leaf\n├── Leaf\n└── Leaf\n";
        assert!(dump.contains(expected), "{dump}");
    }

    #[test]
    fn test_dump_lists_occluders_and_sections() {
        let mut node = RenderNode::default();
        node.occluders.push(Occluder {
            vertices: vec![Vec3::ZERO; 4],
            normal: Vec3::Z,
            dist: 0.0,
            hash: 0x1234,
            name: "WindowBreak".into(),
            kind: Some(OccluderKind::Dynamic),
        });
        let graph = WorldGraph {
            render_nodes: vec![node],
            ..WorldGraph::default()
        };
        let dump = debug_dump(&graph).unwrap();
        assert!(dump.contains("== Render nodes (1) =="));
        assert!(dump.contains("occluder 0x00001234 \"WindowBreak\" DynamicOccluder: 4 vertices"));
        assert!(dump.contains("== FX bindings (0) =="));
    }
}
