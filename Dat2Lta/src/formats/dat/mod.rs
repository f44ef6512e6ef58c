//! LithTech Jupiter compiled world (DAT) format module
//!
//! Decodes version 85 world files into a [`WorldGraph`].

mod cursor;
mod document;
mod layout;
mod properties;
mod reader;
mod surface;

use std::fmt;

// Public API
pub use cursor::DatCursor;
pub use document::{
    BlindObject, BlockerPolygon, Brush, BspNode, DatHeader, FxBinding, GraphSummary,
    KeyFramerKey, KeyFramerPath, LayoutNode, LightGroup, Occluder, OccluderKind, Plane, Polygon,
    Portal, RenderNode, RenderSection, ScatterParticle, ScatterVolume, SubLightmap, Surface,
    Triangle, Vertex, WorldGraph, WorldInfo, WorldLightGroup, WorldModel, WorldModelNode,
    WorldObject, WorldTree, render_section_label, world_model_section_label,
};
pub use layout::{VertexField, VertexLayout};
pub use properties::{Property, PropertyBag, PropertyKind, PropertyValue};
pub use reader::{parse_dat_bytes, read_dat};
pub use surface::{SurfaceFlags, lighting_name, shader_debug_name, shader_lighting_name};

/// The only DAT version this decoder is written against.
pub const DAT_VERSION_JUPITER: u32 = 85;

/// Blind object id of KeyFramer key paths.
pub const BLIND_ID_KEYFRAMER: u32 = 1_789_855_876;

/// Blind object id of ScatterVolume particle data.
pub const BLIND_ID_SCATTER_VOLUME: u32 = 1_945_451_140;

/// Top-level region of a DAT file, used to locate decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    WorldInfo,
    WorldTree,
    Objects,
    BlindObjects,
    Collision,
    ParticleBlockers,
    Geometry,
    WorldModelGeometry,
    LightGroups,
    Fx,
    Occluders,
}

impl Section {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::WorldInfo => "world info",
            Self::WorldTree => "world tree",
            Self::Objects => "objects",
            Self::BlindObjects => "blind objects",
            Self::Collision => "collision polygons",
            Self::ParticleBlockers => "particle blockers",
            Self::Geometry => "render nodes",
            Self::WorldModelGeometry => "world model render nodes",
            Self::LightGroups => "world light groups",
            Self::Fx => "fx table",
            Self::Occluders => "occluders",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
