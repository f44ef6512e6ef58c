//! Main (editable) LTA scene
//!
//! Every kept render section becomes a textured brush. Placed objects carry
//! their world model's brushes as children; KeyFramer paths, sky portals,
//! occluders and blockers follow as their own groups. All positions are
//! shifted by the world offset.

use super::proplist::{BrushProps, brush_proplist, key_proplist, object_proplist};
use super::uv::texture_space;
use crate::formats::dat::{
    Brush, Occluder, OccluderKind, RenderNode, RenderSection, Triangle, WorldGraph, render_section_label,
    shader_lighting_name, world_model_section_label,
};
use crate::formats::dtx::TextureSizes;
use crate::formats::lta::{
    EditPoly, LtaWorld, PolyTextures, Polyhedron, PropList, TextureInfo, WorldNode,
};
use glam::Vec3;
use std::collections::HashMap;

const DEFAULT_TEXTURE: &str = "Default";

/// Build the main LTA world for `graph`.
///
/// The graph should already have gone through the defaulting pass and the
/// occluder classifier; occluders without a kind are treated as dynamic.
pub fn build_main_lta(graph: &WorldGraph, map_name: &str, textures: &mut TextureSizes) -> LtaWorld {
    let builder = MainBuilder {
        graph,
        offset: graph.info.offset,
    };
    let mut world = LtaWorld::new(map_name, Some(graph.info.info_string.clone()));

    let mut groups = Vec::new();
    groups.push(builder.render_nodes(textures));
    if let Some(objects) = builder.objects(textures) {
        groups.push(objects);
    }

    let sky_portals: Vec<WorldNode> = graph
        .sky_portals()
        .map(|portal| {
            let props = BrushProps::new("SkyPortal", "SkyPortal", "Gouraud");
            builder.flat_brush(&portal.vertices, portal.normal, portal.dist, brush_proplist(&props))
        })
        .collect();
    push_group(&mut groups, "SkyPortals", sky_portals);

    let (regular, dynamic): (Vec<_>, Vec<_>) = graph
        .occluders()
        .partition(|occ| occ.kind == Some(OccluderKind::Regular));
    let occluder_brushes = |list: Vec<&Occluder>| -> Vec<WorldNode> {
        list.into_iter()
            .map(|occ| {
                let props = BrushProps::new(&occ.name, "Occluder", "Flat").unlit();
                builder.flat_brush(&occ.vertices, occ.normal, occ.dist, brush_proplist(&props))
            })
            .collect()
    };
    push_group(&mut groups, "Occluders", occluder_brushes(regular));
    push_group(&mut groups, "DynamicOccluders", occluder_brushes(dynamic));

    for (label, name, polygons) in [
        ("Blockers", "Blocker", &graph.collision),
        ("ParticleBlockers", "ParticleBlocker", &graph.particle_blockers),
    ] {
        let brushes = polygons
            .iter()
            .map(|poly| {
                let props = BrushProps::new(name, name, "Flat").unlit();
                builder.flat_brush(&poly.vertices, poly.normal, poly.dist, brush_proplist(&props))
            })
            .collect();
        push_group(&mut groups, label, brushes);
    }

    world.root.children = groups;
    world
}

fn push_group(groups: &mut Vec<WorldNode>, label: &str, children: Vec<WorldNode>) {
    if !children.is_empty() {
        groups.push(WorldNode::null(label).with_children(children));
    }
}

struct MainBuilder<'g> {
    graph: &'g WorldGraph,
    offset: Vec3,
}

impl MainBuilder<'_> {
    /// `RenderNodes` group with one child per node that has kept sections.
    fn render_nodes(&self, textures: &mut TextureSizes) -> WorldNode {
        let mut children = Vec::new();
        for (node_index, node) in self.graph.render_nodes.iter().enumerate() {
            let brushes: Vec<WorldNode> = node
                .kept_sections()
                .map(|(section_index, section, tris)| {
                    let label = render_section_label(node_index, section_index);
                    self.section_brush(node, section, tris, &label, textures)
                })
                .collect();
            if !brushes.is_empty() {
                children.push(WorldNode::null(format!("RenderNode{node_index}")).with_children(brushes));
            }
        }
        WorldNode::null("RenderNodes").with_children(children)
    }

    /// `ObjectsAndWMs` group: placed objects (world model brushes as
    /// children), world models nobody places, and KeyFramer paths.
    fn objects(&self, textures: &mut TextureSizes) -> Option<WorldNode> {
        let graph = self.graph;
        // Each world model hangs under the first object sharing its name
        let mut owner_of: HashMap<usize, usize> = HashMap::new();
        for (wm_index, wm) in graph.world_model_nodes.iter().enumerate() {
            match graph.objects.iter().position(|obj| obj.name() == Some(wm.name.as_str())) {
                Some(object_index) => {
                    owner_of.entry(object_index).or_insert(wm_index);
                }
                None => tracing::warn!(world_model = %wm.name, "World model has no placing object"),
            }
        }

        let mut children = Vec::new();
        for (object_index, object) in graph.objects.iter().enumerate() {
            let mut node = WorldNode::object(&object.type_name, object_proplist(object, self.offset));
            if let Some(&wm_index) = owner_of.get(&object_index) {
                node.children = self.world_model_brushes(wm_index, textures);
            }
            children.push(node);
        }

        let placed: Vec<usize> = owner_of.values().copied().collect();
        for (wm_index, wm) in graph.world_model_nodes.iter().enumerate() {
            if !placed.contains(&wm_index) {
                let brushes = self.world_model_brushes(wm_index, textures);
                if !brushes.is_empty() {
                    children.push(WorldNode::null(&wm.name).with_children(brushes));
                }
            }
        }

        for path in graph.key_paths() {
            let keys = path
                .keys
                .iter()
                .map(|key| WorldNode::object("Key", key_proplist(key, self.offset)))
                .collect();
            children.push(WorldNode::null_with_flags(&path.name, &["path"]).with_children(keys));
        }

        if children.is_empty() {
            None
        } else {
            Some(WorldNode::null("ObjectsAndWMs").with_children(children))
        }
    }

    fn world_model_brushes(&self, wm_index: usize, textures: &mut TextureSizes) -> Vec<WorldNode> {
        let Some(wm) = self.graph.world_model_nodes.get(wm_index) else {
            return Vec::new();
        };
        let mut brushes = Vec::new();
        for (sub_index, node) in wm.nodes.iter().enumerate() {
            for (section_index, section, tris) in node.kept_sections() {
                let label = world_model_section_label(&wm.name, sub_index, section_index);
                brushes.push(self.section_brush(node, section, tris, &label, textures));
            }
        }
        brushes
    }

    /// First source brush any of the triangles links to.
    fn source_brush(&self, tris: &[Triangle]) -> Option<&Brush> {
        tris.iter()
            .find_map(|t| t.brush)
            .and_then(|index| self.graph.brushes.get(index))
    }

    /// One render section as a brush of triangles with locally numbered points.
    fn section_brush(
        &self,
        node: &RenderNode,
        section: &RenderSection,
        tris: &[Triangle],
        label: &str,
        textures: &mut TextureSizes,
    ) -> WorldNode {
        let tex0 = texture_or_default(&section.texture0);
        let tex1 = texture_or_default(&section.texture1);
        let (w0, h0) = textures.size_of(tex0);
        let (w1, h1) = textures.size_of(tex1);

        let mut local: HashMap<u32, usize> = HashMap::new();
        let mut polyhedron = Polyhedron::default();
        for tri in tris {
            let [Some(a), Some(b), Some(c)] = tri.indices.map(|i| node.vertices.get(i as usize)) else {
                tracing::warn!(
                    section = label,
                    indices = ?tri.indices,
                    "Triangle references a missing vertex, skipped"
                );
                continue;
            };
            let v = [a, b, c];

            let mut corners = [0usize; 3];
            for ((corner, &index), vertex) in corners.iter_mut().zip(&tri.indices).zip(v) {
                *corner = *local.entry(index).or_insert_with(|| {
                    polyhedron.points.push(vertex.position + self.offset);
                    polyhedron.points.len() - 1
                });
            }

            let positions = v.map(|vertex| vertex.position + self.offset);
            let normal = v[0].normal;
            let (o0, p0, q0) = texture_space(positions, v.map(|vertex| vertex.uv0), w0, h0);
            let (o1, p1, q1) = texture_space(positions, v.map(|vertex| vertex.uv1), w1, h1);

            polyhedron.polygons.push(EditPoly {
                indices: corners.to_vec(),
                normal,
                dist: positions[0].dot(normal),
                textures: Some(PolyTextures {
                    primary: TextureInfo { origin: o0, u: p0, v: q0, name: tex0.to_string() },
                    secondary: TextureInfo { origin: o1, u: p1, v: q1, name: tex1.to_string() },
                }),
            });
        }

        let source = self.source_brush(tris);
        let texture_effect = section
            .texture_effect()
            .or_else(|| source.and_then(|b| b.properties.get_str("TextureEffect")));
        let not_a_step = source
            .and_then(|b| b.properties.get_bool("NotAStep"))
            .unwrap_or(false);
        let props = BrushProps::new(label, "Normal", shader_lighting_name(section.shader))
            .with_not_a_step(not_a_step)
            .with_texture_effect(texture_effect)
            .with_attributes(&node.properties);

        WorldNode::brush(polyhedron, brush_proplist(&props))
    }

    /// Single-polygon brush (portal, occluder, blocker) with a default texture.
    fn flat_brush(&self, vertices: &[Vec3], normal: Vec3, dist: f32, properties: PropList) -> WorldNode {
        let polyhedron = Polyhedron {
            points: vertices.iter().map(|v| *v + self.offset).collect(),
            polygons: vec![EditPoly {
                indices: (0..vertices.len()).collect(),
                normal,
                dist: dist + normal.dot(self.offset),
                textures: Some(PolyTextures {
                    primary: TextureInfo::unmapped(DEFAULT_TEXTURE),
                    secondary: TextureInfo::unmapped(DEFAULT_TEXTURE),
                }),
            }],
        };
        WorldNode::brush(polyhedron, properties)
    }
}

fn texture_or_default(name: &str) -> &str {
    if name.trim().is_empty() {
        DEFAULT_TEXTURE
    } else {
        name
    }
}
