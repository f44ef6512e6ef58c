//! DAT world graph structure definitions

use super::properties::PropertyBag;
use super::surface::SurfaceFlags;
use glam::{Vec2, Vec3};
use serde::Serialize;
use std::fmt;

/// The fifteen `u32` words at the start of every DAT file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatHeader {
    pub version: u32,
    pub object_data_pos: u32,
    pub blind_object_data_pos: u32,
    pub lightgrid_pos: u32,
    pub collision_data_pos: u32,
    pub particle_blocker_data_pos: u32,
    pub render_data_pos: u32,
    pub packer_type: u32,
    pub packer_version: u32,
    pub reserved: [u32; 6],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldInfo {
    pub info_string: String,
    pub extents_min: Vec3,
    pub extents_max: Vec3,
    /// Added to every position written to LTA.
    pub offset: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub flags: SurfaceFlags,
    pub texture_index: u16,
    pub texture_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub surface: u32,
    pub plane: u32,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BspNode {
    pub polygon: u32,
    pub reserved: u16,
    pub children: [i32; 2],
}

/// One BSP model of the world tree (`PhysicsBSP`, doors, movers...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldModel {
    pub reserved: u32,
    pub info_flags: u32,
    pub name: String,
    pub portal_count: u32,
    pub leaf_count: u32,
    pub poly_vertex_count: u32,
    pub visible_list_count: u32,
    pub leaf_list_count: u32,
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
    pub translation: Vec3,
    pub texture_names: Vec<String>,
    pub planes: Vec<Plane>,
    pub surfaces: Vec<Surface>,
    pub polygons: Vec<Polygon>,
    pub nodes: Vec<BspNode>,
    pub points: Vec<Vec3>,
    pub root_node: i32,
    pub sections: u32,
}

impl WorldModel {
    /// Texture name of a surface, if its index is in range.
    #[must_use]
    pub fn texture_name(&self, surface: usize) -> Option<&str> {
        let surface = self.surfaces.get(surface)?;
        self.texture_names
            .get(usize::from(surface.texture_index))
            .map(String::as_str)
    }
}

/// One node of the world layout quad tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutNode {
    /// Subdivided into four children.
    Branch,
    Leaf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldTree {
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
    pub sub_node_count: u32,
    pub terrain_depth: u32,
    /// Pre-order bit stream, one bit per node, least significant bit first.
    pub layout: Vec<u8>,
    pub world_models: Vec<WorldModel>,
}

impl WorldTree {
    /// Walk the layout quad tree in pre-order.
    ///
    /// `visit` receives, for each node, the "is last sibling" flag of every
    /// node on the path from the root to it (inclusive) and the node kind.
    /// The walk ends early if the bit stream runs out.
    pub fn walk_layout(&self, mut visit: impl FnMut(&[bool], LayoutNode)) {
        let total_bits = self.layout.len() * 8;
        let mut next_bit = 0usize;
        // Children still to visit for every open branch
        let mut pending: Vec<u8> = Vec::new();
        let mut path = vec![true];

        while next_bit < total_bits {
            let byte = self.layout[next_bit / 8];
            let is_branch = (byte >> (next_bit % 8)) & 1 == 1;
            next_bit += 1;

            if is_branch {
                visit(&path, LayoutNode::Branch);
                pending.push(4);
                path.push(false);
                continue;
            }

            visit(&path, LayoutNode::Leaf);
            loop {
                let Some(remaining) = pending.last_mut() else {
                    return;
                };
                *remaining -= 1;
                path.pop();
                if *remaining == 0 {
                    pending.pop();
                    continue;
                }
                let last = *remaining == 1;
                path.push(last);
                break;
            }
        }
    }

    /// Number of (branch, leaf) nodes in the layout tree.
    #[must_use]
    pub fn layout_counts(&self) -> (usize, usize) {
        let mut counts = (0, 0);
        self.walk_layout(|_, node| match node {
            LayoutNode::Branch => counts.0 += 1,
            LayoutNode::Leaf => counts.1 += 1,
        });
        counts
    }
}

/// The polygons of one world model that share a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    /// Index into [`WorldTree::world_models`].
    pub world_model: usize,
    /// Surface index within the world model.
    pub surface: usize,
    /// Polygon indices within the world model, in file order.
    pub polygons: Vec<usize>,
    pub texture: String,
    pub properties: PropertyBag,
}

/// A placed object from the object section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldObject {
    pub type_name: String,
    /// Size field stored before the object; informational only.
    pub declared_size: u16,
    pub properties: PropertyBag,
}

impl WorldObject {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.properties.get_str("Name")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyFramerKey {
    pub name: String,
    pub key_type: u16,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub timestamp: f32,
    pub sound_radius: f32,
    pub sound_name: String,
    pub command: String,
    pub bezier_prev: Option<Vec3>,
    pub bezier_next: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyFramerPath {
    /// `BaseKeyName` of the matching KeyFramer object.
    pub name: String,
    pub keys: Vec<KeyFramerKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterParticle {
    pub position: Vec3,
    pub color: u32,
    pub scale: f32,
    pub wave_rotation: u8,
    pub wave_start: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterVolume {
    pub position: Vec3,
    pub dimensions: Vec3,
    pub particles: Vec<ScatterParticle>,
}

/// Engine-only data attached to objects.
#[derive(Debug, Clone, PartialEq)]
pub enum BlindObject {
    KeyFramer(KeyFramerPath),
    Scatter { name: String, volumes: Vec<ScatterVolume> },
    /// Unknown id, payload kept verbatim.
    Opaque { id: u32, data: Vec<u8> },
}

impl BlindObject {
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            Self::KeyFramer(_) => super::BLIND_ID_KEYFRAMER,
            Self::Scatter { .. } => super::BLIND_ID_SCATTER_VOLUME,
            Self::Opaque { id, .. } => *id,
        }
    }
}

/// Convex polygon from the collision or particle blocker lists.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockerPolygon {
    pub normal: Vec3,
    pub dist: f32,
    pub vertices: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSection {
    pub texture0: String,
    pub texture1: String,
    pub shader: u8,
    pub triangle_count: u32,
    pub texture_effect: String,
    pub lightmap_width: u32,
    pub lightmap_height: u32,
    pub lightmap: Vec<u8>,
}

impl RenderSection {
    /// Animated light placeholder sections, not editable geometry.
    #[must_use]
    pub fn is_light_anim(&self) -> bool {
        self.texture0.trim().eq_ignore_ascii_case("lightanim_base")
    }

    #[must_use]
    pub fn texture_effect(&self) -> Option<&str> {
        if self.texture_effect.is_empty() {
            None
        } else {
            Some(&self.texture_effect)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv0: Vec2,
    pub uv1: Vec2,
    pub color: [u8; 4],
    pub normal: Vec3,
    pub tangent: Option<Vec3>,
    pub binormal: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [u32; 3],
    /// Source polygon in the owning world model.
    pub poly_index: u32,
    /// Index into [`WorldGraph::brushes`] when the source polygon was found.
    pub brush: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    pub vertices: Vec<Vec3>,
    pub normal: Vec3,
    pub dist: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OccluderKind {
    Regular,
    Dynamic,
}

impl fmt::Display for OccluderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => f.write_str("RegularOccluder"),
            Self::Dynamic => f.write_str("DynamicOccluder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Occluder {
    pub vertices: Vec<Vec3>,
    pub normal: Vec3,
    pub dist: f32,
    /// Case-insensitive name hash stored in the file.
    pub hash: u32,
    /// Recovered name, `Occluder` when the hash matched nothing.
    pub name: String,
    /// Set by the classifier.
    pub kind: Option<OccluderKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLightmap {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightGroup {
    pub name: String,
    pub color: Vec3,
    /// Zero-compressed vertex intensities.
    pub intensity: Vec<u8>,
    /// Sub-lightmaps per render section.
    pub section_lightmaps: Vec<Vec<SubLightmap>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderNode {
    pub center: Vec3,
    pub half_dims: Vec3,
    pub sections: Vec<RenderSection>,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub sky_portals: Vec<Portal>,
    pub occluders: Vec<Occluder>,
    pub light_groups: Vec<LightGroup>,
    pub child_flags: u8,
    pub children: [u32; 2],
    /// Rendering attributes (`Detail`, `AmbientLight`, ...).
    pub properties: PropertyBag,
}

impl RenderNode {
    /// Triangles of each section, in section order.
    pub fn section_triangles(&self) -> impl Iterator<Item = (&RenderSection, &[Triangle])> {
        let mut start = 0usize;
        self.sections.iter().map(move |section| {
            let end = (start + section.triangle_count as usize).min(self.triangles.len());
            let tris = &self.triangles[start.min(end)..end];
            start = end;
            (section, tris)
        })
    }

    /// Sections that become editable brushes, numbered after light-anim
    /// sections are dropped.
    pub fn kept_sections(&self) -> impl Iterator<Item = (usize, &RenderSection, &[Triangle])> {
        self.section_triangles()
            .filter(|(section, _)| !section.is_light_anim())
            .enumerate()
            .map(|(index, (section, tris))| (index, section, tris))
    }
}

/// Render nodes of one named world model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldModelNode {
    pub name: String,
    pub nodes: Vec<RenderNode>,
    pub no_child_flag: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldLightGroup {
    pub name: String,
    pub color: Vec3,
    pub offset: [u32; 3],
    pub size: [u32; 3],
    pub data: Vec<u8>,
}

/// Label of the `section`-th kept (non light-anim) section of top-level node `node`.
#[must_use]
pub fn render_section_label(node: usize, section: usize) -> String {
    format!("RN{node}_S{section}")
}

/// Label of a kept section inside a world model sub-node.
#[must_use]
pub fn world_model_section_label(world_model: &str, sub_node: usize, section: usize) -> String {
    format!("{world_model}_{sub_node}_S{section}")
}

/// A texture effect referenced by a render section.
#[derive(Debug, Clone, PartialEq)]
pub struct FxBinding {
    pub effect: String,
    /// Label of the section carrying the effect.
    pub owner: String,
    pub position: Vec3,
}

/// Everything decoded from one DAT file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldGraph {
    pub header: DatHeader,
    pub info: WorldInfo,
    pub tree: WorldTree,
    pub brushes: Vec<Brush>,
    pub objects: Vec<WorldObject>,
    pub blind_objects: Vec<BlindObject>,
    pub collision: Vec<BlockerPolygon>,
    pub particle_blockers: Vec<BlockerPolygon>,
    pub render_nodes: Vec<RenderNode>,
    pub world_model_nodes: Vec<WorldModelNode>,
    pub world_light_groups: Vec<WorldLightGroup>,
    pub fx_bindings: Vec<FxBinding>,
}

impl WorldGraph {
    /// Every render node, top-level first, then world model sub-nodes.
    pub fn all_render_nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.render_nodes
            .iter()
            .chain(self.world_model_nodes.iter().flat_map(|wm| wm.nodes.iter()))
    }

    pub fn all_render_nodes_mut(&mut self) -> impl Iterator<Item = &mut RenderNode> {
        self.render_nodes
            .iter_mut()
            .chain(self.world_model_nodes.iter_mut().flat_map(|wm| wm.nodes.iter_mut()))
    }

    pub fn occluders(&self) -> impl Iterator<Item = &Occluder> {
        self.all_render_nodes().flat_map(|node| node.occluders.iter())
    }

    pub fn occluders_mut(&mut self) -> impl Iterator<Item = &mut Occluder> {
        self.all_render_nodes_mut().flat_map(|node| node.occluders.iter_mut())
    }

    pub fn sky_portals(&self) -> impl Iterator<Item = &Portal> {
        self.all_render_nodes().flat_map(|node| node.sky_portals.iter())
    }

    pub fn key_paths(&self) -> impl Iterator<Item = &KeyFramerPath> {
        self.blind_objects.iter().filter_map(|blind| match blind {
            BlindObject::KeyFramer(path) => Some(path),
            _ => None,
        })
    }

    /// First object whose `Name` property equals `name`.
    #[must_use]
    pub fn object_named(&self, name: &str) -> Option<&WorldObject> {
        self.objects.iter().find(|obj| obj.name() == Some(name))
    }

    /// Counts of every decoded section.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        let (layout_branches, layout_leaves) = self.tree.layout_counts();
        GraphSummary {
            version: self.header.version,
            info_string: self.info.info_string.clone(),
            world_models: self.tree.world_models.len(),
            layout_branches,
            layout_leaves,
            brushes: self.brushes.len(),
            objects: self.objects.len(),
            blind_objects: self.blind_objects.len(),
            collision_polygons: self.collision.len(),
            particle_blockers: self.particle_blockers.len(),
            render_nodes: self.render_nodes.len(),
            world_model_nodes: self.world_model_nodes.len(),
            sections: self.all_render_nodes().map(|n| n.sections.len()).sum(),
            vertices: self.all_render_nodes().map(|n| n.vertices.len()).sum(),
            triangles: self.all_render_nodes().map(|n| n.triangles.len()).sum(),
            sky_portals: self.sky_portals().count(),
            occluders: self.occluders().count(),
            light_groups: self.all_render_nodes().map(|n| n.light_groups.len()).sum(),
            world_light_groups: self.world_light_groups.len(),
            fx_bindings: self.fx_bindings.len(),
        }
    }
}

/// Section counts for `inspect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub version: u32,
    pub info_string: String,
    pub world_models: usize,
    pub layout_branches: usize,
    pub layout_leaves: usize,
    pub brushes: usize,
    pub objects: usize,
    pub blind_objects: usize,
    pub collision_polygons: usize,
    pub particle_blockers: usize,
    pub render_nodes: usize,
    pub world_model_nodes: usize,
    pub sections: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub sky_portals: usize,
    pub occluders: usize,
    pub light_groups: usize,
    pub world_light_groups: usize,
    pub fx_bindings: usize,
}
