//! DAT file reading and parsing
//!
//! The file is decoded by a small state machine. Each stage seeks to its
//! section (the header stores absolute offsets), validates the declared
//! record counts against the bytes left, and hands over to the next stage.
//! The light grid is not decoded.

// Binary format parsing requires many intentional casts between integer types
#![allow(clippy::cast_possible_truncation)]

use super::cursor::DatCursor;
use super::document::{
    BlindObject, BlockerPolygon, Brush, BspNode, DatHeader, FxBinding, KeyFramerKey,
    KeyFramerPath, LightGroup, Occluder, Plane, Polygon, Portal, RenderNode, RenderSection,
    ScatterParticle, ScatterVolume, SubLightmap, Surface, Triangle, Vertex, WorldGraph, WorldInfo,
    WorldLightGroup, WorldModel, WorldModelNode, WorldObject, WorldTree, render_section_label,
    world_model_section_label,
};
use super::layout::VertexLayout;
use super::properties::{Property, PropertyBag, PropertyKind, PropertyValue};
use super::surface::SurfaceFlags;
use super::{BLIND_ID_KEYFRAMER, BLIND_ID_SCATTER_VOLUME, DAT_VERSION_JUPITER, Section};
use crate::error::Result;
use crate::formats::common::hash_name_ic;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// World model whose polygons back the top-level render nodes.
const MAIN_WORLD_MODEL: &str = "PhysicsBSP";

/// Name given to occluders whose hash matches no authored name.
pub(crate) const DEFAULT_OCCLUDER_NAME: &str = "Occluder";

/// Render attributes copied from a placed object onto its world model nodes.
const RENDER_ATTRIBUTES: &[&str] = &[
    "Detail",
    "AmbientLight",
    "LightControl",
    "LMGridSize",
    "ClipLight",
    "CastShadowMesh",
    "ReceiveLight",
    "ReceiveShadows",
    "ReceiveSunlight",
    "LightPenScale",
    "CreaseAngle",
];

// Smallest possible size of each record kind, used to sanity check counts
const MIN_OBJECT_SIZE: usize = 2 + 2 + 4;
const MIN_PROPERTY_SIZE: usize = 2 + 1 + 4 + 2;
const BLIND_HEADER_SIZE: usize = 8;
const KEY_SIZE: usize = 2 + 1 + 1 + 12 + 12 + 4 + 4;
const SCATTER_VOLUME_SIZE: usize = 12 + 12 + 4;
const SCATTER_PARTICLE_SIZE: usize = 12 + 4 + 4 + 1 + 1;
const BLOCKER_HEADER_SIZE: usize = 12 + 4 + 4;
const MIN_SECTION_SIZE: usize = 2 + 2 + 1 + 4 + 2 + 12;
const TRIANGLE_SIZE: usize = 16;
const MIN_PORTAL_SIZE: usize = 1 + 12 + 4;
const MIN_OCCLUDER_SIZE: usize = MIN_PORTAL_SIZE + 4;
const MIN_LIGHT_GROUP_SIZE: usize = 2 + 12 + 4 + 4;
const SUB_LIGHTMAP_HEADER_SIZE: usize = 20;
const MIN_WORLD_LIGHT_GROUP_SIZE: usize = 2 + 12 + 12 + 12;

/// Decoder states, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    WorldTree,
    Objects,
    BlindObjects,
    Blockers,
    Geometry,
    Fx,
    Occluders,
    Done,
}

/// Read a DAT file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or does not decode with the
/// given vertex layout.
pub fn read_dat<P: AsRef<Path>>(path: P, layout: VertexLayout) -> Result<WorldGraph> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_dat_bytes(&buffer, layout)
}

/// Parse DAT data from bytes
///
/// # Errors
/// Returns [`crate::Error::TruncatedInput`] when the buffer ends inside a
/// record and [`crate::Error::UnexpectedSectionLayout`] when a declared
/// count or index disagrees with the data, the usual symptom of a wrong
/// vertex layout.
pub fn parse_dat_bytes(data: &[u8], layout: VertexLayout) -> Result<WorldGraph> {
    let mut decoder = DatDecoder::new(data, layout);
    let mut stage = Stage::Header;
    while stage != Stage::Done {
        stage = decoder.step(stage)?;
    }
    Ok(decoder.graph)
}

struct DatDecoder<'a> {
    cursor: DatCursor<'a>,
    layout: VertexLayout,
    graph: WorldGraph,
    /// (world model, polygon) to index in `graph.brushes`
    polygon_brushes: HashMap<(usize, usize), usize>,
}

impl<'a> DatDecoder<'a> {
    fn new(data: &'a [u8], layout: VertexLayout) -> Self {
        Self {
            cursor: DatCursor::new(data),
            layout,
            graph: WorldGraph::default(),
            polygon_brushes: HashMap::new(),
        }
    }

    fn step(&mut self, stage: Stage) -> Result<Stage> {
        let next = match stage {
            Stage::Header => {
                self.read_header()?;
                self.read_world_info()?;
                Stage::WorldTree
            }
            Stage::WorldTree => {
                self.read_world_tree()?;
                self.collect_brushes();
                Stage::Objects
            }
            Stage::Objects => {
                self.read_objects()?;
                Stage::BlindObjects
            }
            Stage::BlindObjects => {
                self.read_blind_objects()?;
                Stage::Blockers
            }
            Stage::Blockers => {
                let collision_pos = self.graph.header.collision_data_pos;
                self.graph.collision = self.read_blockers(Section::Collision, collision_pos)?;
                let particle_pos = self.graph.header.particle_blocker_data_pos;
                self.graph.particle_blockers =
                    self.read_blockers(Section::ParticleBlockers, particle_pos)?;
                tracing::debug!(
                    collision = self.graph.collision.len(),
                    particle_blockers = self.graph.particle_blockers.len(),
                    "Read blocker polygons"
                );
                Stage::Geometry
            }
            Stage::Geometry => {
                self.read_render_data()?;
                Stage::Fx
            }
            Stage::Fx => {
                self.collect_fx_bindings();
                Stage::Occluders
            }
            Stage::Occluders => {
                self.resolve_occluder_names();
                Stage::Done
            }
            Stage::Done => Stage::Done,
        };
        Ok(next)
    }

    // ==================== Header ====================

    fn read_header(&mut self) -> Result<()> {
        let c = &mut self.cursor;
        c.enter(Section::Header);
        let header = DatHeader {
            version: c.read_u32()?,
            object_data_pos: c.read_u32()?,
            blind_object_data_pos: c.read_u32()?,
            lightgrid_pos: c.read_u32()?,
            collision_data_pos: c.read_u32()?,
            particle_blocker_data_pos: c.read_u32()?,
            render_data_pos: c.read_u32()?,
            packer_type: c.read_u32()?,
            packer_version: c.read_u32()?,
            reserved: [
                c.read_u32()?,
                c.read_u32()?,
                c.read_u32()?,
                c.read_u32()?,
                c.read_u32()?,
                c.read_u32()?,
            ],
        };

        if header.version != DAT_VERSION_JUPITER {
            tracing::warn!(
                version = header.version,
                expected = DAT_VERSION_JUPITER,
                "Unexpected DAT version, decoding anyway"
            );
        }
        tracing::debug!(version = header.version, render_data = header.render_data_pos, "Read DAT header");
        self.graph.header = header;
        Ok(())
    }

    fn read_world_info(&mut self) -> Result<()> {
        let c = &mut self.cursor;
        c.enter(Section::WorldInfo);
        self.graph.info = WorldInfo {
            info_string: c.read_long_string()?,
            extents_min: c.read_vec3()?,
            extents_max: c.read_vec3()?,
            offset: c.read_vec3()?,
        };
        Ok(())
    }

    // ==================== World tree ====================

    fn read_world_tree(&mut self) -> Result<()> {
        self.cursor.enter(Section::WorldTree);
        let c = &mut self.cursor;
        let bbox_min = c.read_vec3()?;
        let bbox_max = c.read_vec3()?;
        let sub_node_count = c.read_u32()?;
        let terrain_depth = c.read_u32()?;
        let layout_len = (sub_node_count as usize).div_ceil(8);
        let layout = c.read_bytes(layout_len)?;

        let model_count = c.read_u32()? as usize;
        c.ensure_records("world models", model_count, 4 + 4 + 2)?;
        let mut world_models = Vec::with_capacity(model_count);
        for _ in 0..model_count {
            world_models.push(self.read_world_model()?);
        }

        tracing::debug!(world_models = world_models.len(), sub_node_count, "Read world tree");
        self.graph.tree = WorldTree {
            bbox_min,
            bbox_max,
            sub_node_count,
            terrain_depth,
            layout,
            world_models,
        };
        Ok(())
    }

    fn read_world_model(&mut self) -> Result<WorldModel> {
        let c = &mut self.cursor;
        let reserved = c.read_u32()?;
        let info_flags = c.read_u32()?;
        let name = c.read_string()?;

        let point_count = c.read_u32()? as usize;
        let plane_count = c.read_u32()? as usize;
        let surface_count = c.read_u32()? as usize;
        let portal_count = c.read_u32()?;
        let polygon_count = c.read_u32()? as usize;
        let leaf_count = c.read_u32()?;
        let poly_vertex_count = c.read_u32()?;
        let visible_list_count = c.read_u32()?;
        let leaf_list_count = c.read_u32()?;
        let node_count = c.read_u32()? as usize;

        let bbox_min = c.read_vec3()?;
        let bbox_max = c.read_vec3()?;
        let translation = c.read_vec3()?;

        let names_size = c.read_u32()? as usize;
        let declared_names = c.read_u32()? as usize;
        let raw_names = c.read_bytes(names_size)?;
        let texture_names = split_texture_names(&raw_names);
        if texture_names.len() != declared_names {
            tracing::debug!(
                world_model = %name,
                declared = declared_names,
                found = texture_names.len(),
                "Texture name count differs from header"
            );
        }

        let vertex_counts = c.read_bytes(polygon_count)?;

        c.ensure_records("planes", plane_count, 16)?;
        let mut planes = Vec::with_capacity(plane_count);
        for _ in 0..plane_count {
            planes.push(Plane {
                normal: c.read_vec3()?,
                dist: c.read_f32()?,
            });
        }

        c.ensure_records("surfaces", surface_count, 8)?;
        let mut surfaces = Vec::with_capacity(surface_count);
        for _ in 0..surface_count {
            surfaces.push(Surface {
                flags: SurfaceFlags(c.read_u32()?),
                texture_index: c.read_u16()?,
                texture_flags: c.read_u16()?,
            });
        }

        let mut polygons = Vec::with_capacity(polygon_count);
        for &vertex_count in &vertex_counts {
            let surface = c.read_u32()?;
            let plane = c.read_u32()?;
            let mut indices = Vec::with_capacity(usize::from(vertex_count));
            for _ in 0..vertex_count {
                indices.push(c.read_u32()?);
            }
            polygons.push(Polygon { surface, plane, indices });
        }

        c.ensure_records("bsp nodes", node_count, 14)?;
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            nodes.push(BspNode {
                polygon: c.read_u32()?,
                reserved: c.read_u16()?,
                children: [c.read_i32()?, c.read_i32()?],
            });
        }

        c.ensure_records("points", point_count, 12)?;
        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            points.push(c.read_vec3()?);
        }

        let root_node = c.read_i32()?;
        let sections = c.read_u32()?;

        // Indices can only be checked once every table has been read
        for polygon in &polygons {
            if polygon.surface as usize >= surfaces.len() {
                return Err(c.layout_error("polygon surface index", surfaces.len() as u64, u64::from(polygon.surface)));
            }
            if polygon.plane as usize >= planes.len() {
                return Err(c.layout_error("polygon plane index", planes.len() as u64, u64::from(polygon.plane)));
            }
            if let Some(&bad) = polygon.indices.iter().find(|&&i| i as usize >= points.len()) {
                return Err(c.layout_error("polygon point index", points.len() as u64, u64::from(bad)));
            }
        }

        Ok(WorldModel {
            reserved,
            info_flags,
            name,
            portal_count,
            leaf_count,
            poly_vertex_count,
            visible_list_count,
            leaf_list_count,
            bbox_min,
            bbox_max,
            translation,
            texture_names,
            planes,
            surfaces,
            polygons,
            nodes,
            points,
            root_node,
            sections,
        })
    }

    /// Group each world model's polygons by surface into brushes.
    fn collect_brushes(&mut self) {
        for (model_index, model) in self.graph.tree.world_models.iter().enumerate() {
            let mut by_surface: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for (poly_index, polygon) in model.polygons.iter().enumerate() {
                by_surface.entry(polygon.surface as usize).or_default().push(poly_index);
            }

            for (ordinal, (surface_index, polygons)) in by_surface.into_iter().enumerate() {
                let brush_index = self.graph.brushes.len();
                for &poly in &polygons {
                    self.polygon_brushes.insert((model_index, poly), brush_index);
                }
                let flags = model.surfaces[surface_index].flags;
                self.graph.brushes.push(Brush {
                    world_model: model_index,
                    surface: surface_index,
                    polygons,
                    texture: model
                        .texture_name(surface_index)
                        .unwrap_or("Default")
                        .to_string(),
                    properties: surface_properties(ordinal, flags),
                });
            }
        }
        tracing::debug!(brushes = self.graph.brushes.len(), "Grouped polygons into brushes");
    }

    // ==================== Objects ====================

    fn read_objects(&mut self) -> Result<()> {
        self.cursor.enter(Section::Objects);
        self.cursor.seek_to(self.graph.header.object_data_pos)?;
        let count = self.cursor.read_u32()? as usize;
        self.cursor.ensure_records("objects", count, MIN_OBJECT_SIZE)?;

        let mut objects = Vec::with_capacity(count);
        for _ in 0..count {
            objects.push(self.read_object()?);
        }
        tracing::debug!(objects = objects.len(), "Read world objects");
        self.graph.objects = objects;
        Ok(())
    }

    fn read_object(&mut self) -> Result<WorldObject> {
        let c = &mut self.cursor;
        let declared_size = c.read_u16()?;
        let type_name = c.read_string()?;
        let prop_count = c.read_u32()? as usize;
        c.ensure_records("object properties", prop_count, MIN_PROPERTY_SIZE)?;

        let mut properties = PropertyBag::new();
        for _ in 0..prop_count {
            let name = c.read_string()?;
            let kind = PropertyKind::from_code(c.read_u8()?);
            let flags = c.read_u32()?;
            let data_size = c.read_u16()?;

            let value = match kind {
                PropertyKind::String => PropertyValue::String(c.read_string()?),
                PropertyKind::Vector => PropertyValue::Vector(c.read_vec3()?),
                PropertyKind::Color => PropertyValue::Color(c.read_vec3()?),
                PropertyKind::Real => PropertyValue::Real(c.read_f32()?),
                PropertyKind::Bool => PropertyValue::Bool(c.read_u8()? != 0),
                PropertyKind::LongInt => PropertyValue::LongInt(c.read_f32()?),
                PropertyKind::Rotation => PropertyValue::Rotation(c.read_quat()?),
                PropertyKind::Unknown(data_type) => PropertyValue::Raw {
                    data_type,
                    bytes: c.read_bytes(usize::from(data_size))?,
                },
            };
            properties.insert(name, Property::new(value).with_flags(flags));
        }

        Ok(WorldObject {
            type_name,
            declared_size,
            properties,
        })
    }

    // ==================== Blind objects ====================

    fn read_blind_objects(&mut self) -> Result<()> {
        self.cursor.enter(Section::BlindObjects);
        self.cursor.seek_to(self.graph.header.blind_object_data_pos)?;

        // Blind data carries no names; they come from the objects in order
        let mut keyframer_names = names_of(&self.graph.objects, "KeyFramer", "BaseKeyName").into_iter();
        let mut scatter_names = names_of(&self.graph.objects, "ScatterVolume", "Name").into_iter();
        let mut keyframers = 0usize;
        let mut scatters = 0usize;

        let count = self.cursor.read_u32()? as usize;
        self.cursor.ensure_records("blind objects", count, BLIND_HEADER_SIZE)?;
        let mut blind_objects = Vec::with_capacity(count);

        for _ in 0..count {
            let engine_size = self.cursor.read_u32()? as usize;
            let id = self.cursor.read_u32()?;
            let blind = match id {
                BLIND_ID_KEYFRAMER => {
                    let name = keyframer_names
                        .next()
                        .unwrap_or_else(|| format!("UnknownKeyFramer{keyframers}"));
                    keyframers += 1;
                    BlindObject::KeyFramer(self.read_key_path(name)?)
                }
                BLIND_ID_SCATTER_VOLUME => {
                    let name = scatter_names
                        .next()
                        .unwrap_or_else(|| format!("UnknownScatterVolume{scatters}"));
                    scatters += 1;
                    BlindObject::Scatter {
                        name,
                        volumes: self.read_scatter_volumes()?,
                    }
                }
                _ => BlindObject::Opaque {
                    id,
                    data: self.cursor.read_bytes(engine_size)?,
                },
            };
            blind_objects.push(blind);
        }

        tracing::debug!(blind_objects = blind_objects.len(), keyframers, scatters, "Read blind objects");
        self.graph.blind_objects = blind_objects;
        Ok(())
    }

    fn read_key_path(&mut self, base_name: String) -> Result<KeyFramerPath> {
        let c = &mut self.cursor;
        let key_count = c.read_u32()? as usize;
        c.ensure_records("keyframer keys", key_count, KEY_SIZE)?;

        let mut keys = Vec::with_capacity(key_count);
        for index in 0..key_count {
            let key_type = c.read_u16()?;
            let sound_len = usize::from(c.read_u8()?);
            let command_len = usize::from(c.read_u8()?);
            let position = c.read_vec3()?;
            let rotation = c.read_vec3()?;
            let timestamp = c.read_f32()?;
            let sound_radius = c.read_f32()?;
            let sound_name = c.read_fixed_string(sound_len)?;
            let command = c.read_fixed_string(command_len)?;

            let (bezier_prev, bezier_next) = match key_type {
                0 => (None, None),
                1 => (Some(c.read_vec3()?), None),
                2 => (None, Some(c.read_vec3()?)),
                3 => (Some(c.read_vec3()?), Some(c.read_vec3()?)),
                other => return Err(c.layout_error("keyframer key type", 3, u64::from(other))),
            };

            keys.push(KeyFramerKey {
                name: key_name(&base_name, index),
                key_type,
                position,
                rotation,
                timestamp,
                sound_radius,
                sound_name,
                command,
                bezier_prev,
                bezier_next,
            });
        }

        Ok(KeyFramerPath { name: base_name, keys })
    }

    fn read_scatter_volumes(&mut self) -> Result<Vec<ScatterVolume>> {
        let c = &mut self.cursor;
        let volume_count = c.read_u32()? as usize;
        c.ensure_records("scatter volumes", volume_count, SCATTER_VOLUME_SIZE)?;

        let mut volumes = Vec::with_capacity(volume_count);
        for _ in 0..volume_count {
            let position = c.read_vec3()?;
            let dimensions = c.read_vec3()?;
            let particle_count = c.read_u32()? as usize;
            c.ensure_records("scatter particles", particle_count, SCATTER_PARTICLE_SIZE)?;

            let mut particles = Vec::with_capacity(particle_count);
            for _ in 0..particle_count {
                particles.push(ScatterParticle {
                    position: c.read_vec3()?,
                    color: c.read_u32()?,
                    scale: c.read_f32()?,
                    wave_rotation: c.read_u8()?,
                    wave_start: c.read_u8()?,
                });
            }
            volumes.push(ScatterVolume {
                position,
                dimensions,
                particles,
            });
        }
        Ok(volumes)
    }

    // ==================== Blockers ====================

    fn read_blockers(&mut self, section: Section, offset: u32) -> Result<Vec<BlockerPolygon>> {
        let c = &mut self.cursor;
        c.enter(section);
        c.seek_to(offset)?;
        let count = c.read_u32()? as usize;
        c.ensure_records("blocker polygons", count, BLOCKER_HEADER_SIZE)?;

        let mut polygons = Vec::with_capacity(count);
        for _ in 0..count {
            let normal = c.read_vec3()?;
            let dist = c.read_f32()?;
            let vertex_count = c.read_u32()? as usize;
            c.ensure_records("blocker vertices", vertex_count, 12)?;
            let mut vertices = Vec::with_capacity(vertex_count);
            for _ in 0..vertex_count {
                vertices.push(c.read_vec3()?);
            }
            polygons.push(BlockerPolygon { normal, dist, vertices });
        }
        Ok(polygons)
    }

    // ==================== Render data ====================

    fn read_render_data(&mut self) -> Result<()> {
        self.cursor.enter(Section::Geometry);
        self.cursor.seek_to(self.graph.header.render_data_pos)?;

        let main_model = self
            .graph
            .tree
            .world_models
            .iter()
            .position(|wm| wm.name == MAIN_WORLD_MODEL)
            .or_else(|| (!self.graph.tree.world_models.is_empty()).then_some(0));

        let node_count = self.cursor.read_u32()? as usize;
        self.cursor.ensure_records("render nodes", node_count, 12 + 12 + 4)?;
        let mut render_nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            render_nodes.push(self.read_render_node(main_model)?);
        }
        tracing::debug!(render_nodes = render_nodes.len(), "Read render nodes");

        self.cursor.enter(Section::WorldModelGeometry);
        let wm_count = self.cursor.read_u32()? as usize;
        self.cursor.ensure_records("world model render nodes", wm_count, 2 + 4 + 4)?;
        let mut world_model_nodes = Vec::with_capacity(wm_count);
        for _ in 0..wm_count {
            let name = self.cursor.read_string()?;
            let model = self.graph.tree.world_models.iter().position(|wm| wm.name == name);
            let sub_count = self.cursor.read_u32()? as usize;
            self.cursor.ensure_records("world model sub-nodes", sub_count, 12 + 12 + 4)?;

            let authored = self.authored_render_attributes(&name);
            let mut nodes = Vec::with_capacity(sub_count);
            for _ in 0..sub_count {
                let mut node = self.read_render_node(model)?;
                node.properties = authored.clone();
                nodes.push(node);
            }
            let no_child_flag = self.cursor.read_u32()?;
            world_model_nodes.push(WorldModelNode {
                name,
                nodes,
                no_child_flag,
            });
        }
        tracing::debug!(world_model_nodes = world_model_nodes.len(), "Read world model render nodes");

        self.cursor.enter(Section::LightGroups);
        let group_count = self.cursor.read_u32()? as usize;
        self.cursor.ensure_records("world light groups", group_count, MIN_WORLD_LIGHT_GROUP_SIZE)?;
        let mut world_light_groups = Vec::with_capacity(group_count);
        for _ in 0..group_count {
            let c = &mut self.cursor;
            let name = c.read_string()?;
            let color = c.read_vec3()?;
            let offset = c.read_uvec3()?;
            let size = c.read_uvec3()?;
            let len = size
                .iter()
                .try_fold(1usize, |acc, &dim| acc.checked_mul(dim as usize))
                .unwrap_or(usize::MAX);
            c.ensure_records("light grid bytes", len, 1)?;
            world_light_groups.push(WorldLightGroup {
                name,
                color,
                offset,
                size,
                data: c.read_bytes(len)?,
            });
        }

        self.link_texture_effects(&render_nodes, &world_model_nodes);
        self.graph.render_nodes = render_nodes;
        self.graph.world_model_nodes = world_model_nodes;
        self.graph.world_light_groups = world_light_groups;
        Ok(())
    }

    fn read_render_node(&mut self, world_model: Option<usize>) -> Result<RenderNode> {
        let c = &mut self.cursor;
        let center = c.read_vec3()?;
        let half_dims = c.read_vec3()?;

        let section_count = c.read_u32()? as usize;
        c.ensure_records("render sections", section_count, MIN_SECTION_SIZE)?;
        let mut sections = Vec::with_capacity(section_count);
        for _ in 0..section_count {
            let texture0 = c.read_string()?;
            let texture1 = c.read_string()?;
            let shader = c.read_u8()?;
            let triangle_count = c.read_u32()?;
            let texture_effect = c.read_string()?;
            let lightmap_width = c.read_u32()?;
            let lightmap_height = c.read_u32()?;
            let lightmap_size = c.read_u32()? as usize;
            sections.push(RenderSection {
                texture0,
                texture1,
                shader,
                triangle_count,
                texture_effect,
                lightmap_width,
                lightmap_height,
                lightmap: c.read_bytes(lightmap_size)?,
            });
        }

        let vertex_count = c.read_u32()? as usize;
        c.ensure_records("vertices", vertex_count, self.layout.stride())?;
        let with_tangents = self.layout.has_tangents();
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let position = c.read_vec3()?;
            let uv0 = c.read_vec2()?;
            let uv1 = c.read_vec2()?;
            let color = [c.read_u8()?, c.read_u8()?, c.read_u8()?, c.read_u8()?];
            let normal = c.read_vec3()?;
            let (tangent, binormal) = if with_tangents {
                (Some(c.read_vec3()?), Some(c.read_vec3()?))
            } else {
                (None, None)
            };
            vertices.push(Vertex {
                position,
                uv0,
                uv1,
                color,
                normal,
                tangent,
                binormal,
            });
        }

        let triangle_total = c.read_u32()? as usize;
        c.ensure_records("triangles", triangle_total, TRIANGLE_SIZE)?;
        let declared: u64 = sections.iter().map(|s| u64::from(s.triangle_count)).sum();
        if declared != triangle_total as u64 {
            return Err(c.layout_error("section triangle total", declared, triangle_total as u64));
        }

        let mut triangles = Vec::with_capacity(triangle_total);
        for _ in 0..triangle_total {
            let indices = [c.read_u32()?, c.read_u32()?, c.read_u32()?];
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(c.layout_error("triangle vertex index", vertex_count as u64, u64::from(bad)));
            }
            let poly_index = c.read_u32()?;
            let brush = world_model
                .and_then(|wm| self.polygon_brushes.get(&(wm, poly_index as usize)))
                .copied();
            triangles.push(Triangle {
                indices,
                poly_index,
                brush,
            });
        }

        let portal_count = c.read_u32()? as usize;
        c.ensure_records("sky portals", portal_count, MIN_PORTAL_SIZE)?;
        let mut sky_portals = Vec::with_capacity(portal_count);
        for _ in 0..portal_count {
            let vertices = read_points(c)?;
            sky_portals.push(Portal {
                vertices,
                normal: c.read_vec3()?,
                dist: c.read_f32()?,
            });
        }

        let occluder_count = c.read_u32()? as usize;
        c.ensure_records("occluders", occluder_count, MIN_OCCLUDER_SIZE)?;
        let mut occluders = Vec::with_capacity(occluder_count);
        for _ in 0..occluder_count {
            let vertices = read_points(c)?;
            occluders.push(Occluder {
                vertices,
                normal: c.read_vec3()?,
                dist: c.read_f32()?,
                hash: c.read_u32()?,
                name: DEFAULT_OCCLUDER_NAME.to_string(),
                kind: None,
            });
        }

        let group_count = c.read_u32()? as usize;
        c.ensure_records("light groups", group_count, MIN_LIGHT_GROUP_SIZE)?;
        let mut light_groups = Vec::with_capacity(group_count);
        for _ in 0..group_count {
            let name = c.read_string()?;
            let color = c.read_vec3()?;
            let intensity_len = c.read_u32()? as usize;
            let intensity = c.read_bytes(intensity_len)?;
            let section_count = c.read_u32()? as usize;
            c.ensure_records("light group sections", section_count, 4)?;
            let mut section_lightmaps = Vec::with_capacity(section_count);
            for _ in 0..section_count {
                let sub_count = c.read_u32()? as usize;
                c.ensure_records("sub-lightmaps", sub_count, SUB_LIGHTMAP_HEADER_SIZE)?;
                let mut subs = Vec::with_capacity(sub_count);
                for _ in 0..sub_count {
                    let left = c.read_u32()?;
                    let top = c.read_u32()?;
                    let width = c.read_u32()?;
                    let height = c.read_u32()?;
                    let data_len = c.read_u32()? as usize;
                    subs.push(SubLightmap {
                        left,
                        top,
                        width,
                        height,
                        data: c.read_bytes(data_len)?,
                    });
                }
                section_lightmaps.push(subs);
            }
            light_groups.push(LightGroup {
                name,
                color,
                intensity,
                section_lightmaps,
            });
        }

        let child_flags = c.read_u8()?;
        let children = [c.read_u32()?, c.read_u32()?];

        Ok(RenderNode {
            center,
            half_dims,
            sections,
            vertices,
            triangles,
            sky_portals,
            occluders,
            light_groups,
            child_flags,
            children,
            properties: PropertyBag::new(),
        })
    }

    /// Render attributes authored on the object placing world model `name`.
    fn authored_render_attributes(&self, name: &str) -> PropertyBag {
        let Some(object) = self.graph.object_named(name) else {
            return PropertyBag::new();
        };
        RENDER_ATTRIBUTES
            .iter()
            .filter_map(|&key| {
                object
                    .properties
                    .get(key)
                    .map(|prop| (key.to_string(), prop.clone()))
            })
            .collect()
    }

    /// Copy each section's texture effect onto the brushes its triangles came from.
    fn link_texture_effects(&mut self, render_nodes: &[RenderNode], wm_nodes: &[WorldModelNode]) {
        let nodes = render_nodes.iter().chain(wm_nodes.iter().flat_map(|wm| wm.nodes.iter()));
        for node in nodes {
            for (section, tris) in node.section_triangles() {
                let Some(effect) = section.texture_effect() else {
                    continue;
                };
                for brush in tris.iter().filter_map(|t| t.brush) {
                    if let Some(brush) = self.graph.brushes.get_mut(brush) {
                        brush
                            .properties
                            .set("TextureEffect", PropertyValue::String(effect.to_string()));
                    }
                }
            }
        }
    }

    // ==================== Derived tables ====================

    /// One binding per kept section that references a texture effect.
    fn collect_fx_bindings(&mut self) {
        let mut bindings = Vec::new();
        for (node_index, node) in self.graph.render_nodes.iter().enumerate() {
            for (section_index, section, _) in node.kept_sections() {
                if let Some(effect) = section.texture_effect() {
                    bindings.push(FxBinding {
                        effect: effect.to_string(),
                        owner: render_section_label(node_index, section_index),
                        position: node.center,
                    });
                }
            }
        }
        for wm in &self.graph.world_model_nodes {
            for (sub_index, node) in wm.nodes.iter().enumerate() {
                for (section_index, section, _) in node.kept_sections() {
                    if let Some(effect) = section.texture_effect() {
                        bindings.push(FxBinding {
                            effect: effect.to_string(),
                            owner: world_model_section_label(&wm.name, sub_index, section_index),
                            position: node.center,
                        });
                    }
                }
            }
        }
        tracing::debug!(fx_bindings = bindings.len(), "Collected texture effect bindings");
        self.graph.fx_bindings = bindings;
    }

    /// Recover occluder names from `DynamicOccluderVolume` objects by hash.
    fn resolve_occluder_names(&mut self) {
        let mut names: HashMap<u32, String> = HashMap::new();
        for object in self
            .graph
            .objects
            .iter()
            .filter(|obj| obj.type_name == "DynamicOccluderVolume")
        {
            for (key, prop) in object.properties.iter() {
                if !key.starts_with("OccluderName") {
                    continue;
                }
                match &prop.value {
                    PropertyValue::String(name) if !name.is_empty() => {
                        names.entry(hash_name_ic(name)).or_insert_with(|| name.clone());
                    }
                    _ => {}
                }
            }
        }

        let mut resolved = 0usize;
        for occluder in self.graph.occluders_mut() {
            if let Some(name) = names.get(&occluder.hash) {
                occluder.name.clone_from(name);
                resolved += 1;
            }
        }
        tracing::debug!(names = names.len(), resolved, "Resolved occluder names");
    }
}

/// `u8` vertex count followed by that many points.
fn read_points(c: &mut DatCursor<'_>) -> Result<Vec<glam::Vec3>> {
    let count = usize::from(c.read_u8()?);
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push(c.read_vec3()?);
    }
    Ok(points)
}

/// NUL separated texture paths with forward slashes.
fn split_texture_names(raw: &[u8]) -> Vec<String> {
    raw.split(|&b| b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| String::from_utf8_lossy(name).replace('\\', "/"))
        .collect()
}

/// String values of `property` on objects of `type_name`, in file order.
fn names_of(objects: &[WorldObject], type_name: &str, property: &str) -> Vec<String> {
    objects
        .iter()
        .filter(|obj| obj.type_name == type_name)
        .filter_map(|obj| obj.properties.get_str(property))
        .map(str::to_string)
        .collect()
}

/// Key names follow the editor's numbering: `Base0`, `Base01`, `Base02`...
fn key_name(base: &str, index: usize) -> String {
    if index == 0 {
        format!("{base}0")
    } else {
        format!("{base}{index:02}")
    }
}

/// Brush properties derived from surface flags.
fn surface_properties(ordinal: usize, flags: SurfaceFlags) -> PropertyBag {
    let mut bag = PropertyBag::new();
    bag.set("Name", PropertyValue::String(format!("Surface{ordinal}")));
    bag.set("Type", PropertyValue::String(flags.brush_type().to_string()));
    bag.set("Lighting", PropertyValue::String(flags.lighting().to_string()));
    for (key, bit) in [
        ("NotAStep", SurfaceFlags::NOTASTEP),
        ("ClipLight", SurfaceFlags::CLIPLIGHT),
        ("CastShadowMesh", SurfaceFlags::CASTSHADOWMESH),
        ("ReceiveLight", SurfaceFlags::RECEIVELIGHT),
        ("ReceiveShadows", SurfaceFlags::RECEIVESHADOWS),
        ("ReceiveSunlight", SurfaceFlags::RECEIVESUNLIGHT),
    ] {
        bag.set(key, PropertyValue::Bool(flags.contains(bit)));
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_name("Door", 0), "Door0");
        assert_eq!(key_name("Door", 1), "Door01");
        assert_eq!(key_name("Door", 12), "Door12");
    }

    #[test]
    fn test_split_texture_names() {
        let raw = b"Tex\\Wall.dtx\0\0Tex\\Floor.dtx\0";
        assert_eq!(split_texture_names(raw), vec!["Tex/Wall.dtx", "Tex/Floor.dtx"]);
        assert!(split_texture_names(b"").is_empty());
    }

    #[test]
    fn test_surface_properties() {
        let flags = SurfaceFlags(SurfaceFlags::SOLID | SurfaceFlags::NOTASTEP | SurfaceFlags::LIGHTMAP);
        let bag = surface_properties(3, flags);
        assert_eq!(bag.get_str("Name"), Some("Surface3"));
        assert_eq!(bag.get_str("Type"), Some("Normal"));
        assert_eq!(bag.get_str("Lighting"), Some("Lightmap"));
        assert_eq!(bag.get_bool("NotAStep"), Some(true));
        assert_eq!(bag.get_bool("ClipLight"), Some(false));
        assert!(!bag.contains("TextureEffect"));
    }

    #[test]
    fn test_empty_buffer_is_truncated_header() {
        match parse_dat_bytes(&[], VertexLayout::Compact) {
            Err(crate::Error::TruncatedInput { section, offset, .. }) => {
                assert_eq!(section, Section::Header);
                assert_eq!(offset, 0);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
    }

    #[test]
    fn test_header_offset_past_end_is_layout_error() {
        // Header + minimal world info + empty world tree, objects offset out of range
        let mut data = Vec::new();
        let mut header = [0u32; 15];
        header[0] = 85;
        header[1] = 10_000;
        for word in header {
            data.extend_from_slice(&word.to_le_bytes());
        }
        data.extend_from_slice(&0u32.to_le_bytes()); // info string
        data.extend_from_slice(&[0u8; 36]); // extents + offset
        data.extend_from_slice(&[0u8; 24]); // tree bbox
        data.extend_from_slice(&0u32.to_le_bytes()); // sub nodes
        data.extend_from_slice(&0u32.to_le_bytes()); // terrain depth
        data.extend_from_slice(&0u32.to_le_bytes()); // world models

        match parse_dat_bytes(&data, VertexLayout::Compact) {
            Err(crate::Error::UnexpectedSectionLayout { section, what, .. }) => {
                assert_eq!(section, Section::Objects);
                assert_eq!(what, "section offset");
            }
            other => panic!("expected UnexpectedSectionLayout, got {other:?}"),
        }
    }
}
