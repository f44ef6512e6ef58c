//! Surface flag and shader code tables

use std::fmt;

/// Bit set stored in each world model surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceFlags(pub u32);

impl SurfaceFlags {
    pub const SOLID: u32 = 1 << 0;
    pub const NONEXISTENT: u32 = 1 << 1;
    pub const INVISIBLE: u32 = 1 << 2;
    pub const SKY: u32 = 1 << 4;
    pub const FLATSHADE: u32 = 1 << 6;
    pub const LIGHTMAP: u32 = 1 << 7;
    pub const NOSUBDIV: u32 = 1 << 8;
    pub const PARTICLEBLOCKER: u32 = 1 << 10;
    pub const GOURAUDSHADE: u32 = 1 << 12;
    pub const PHYSICSBLOCKER: u32 = 1 << 17;
    pub const RBSPLITTER: u32 = 1 << 19;
    pub const VISBLOCKER: u32 = 1 << 21;
    pub const NOTASTEP: u32 = 1 << 22;
    pub const RECEIVELIGHT: u32 = 1 << 24;
    pub const RECEIVESHADOWS: u32 = 1 << 25;
    pub const RECEIVESUNLIGHT: u32 = 1 << 26;
    pub const SHADOWMESH: u32 = 1 << 28;
    pub const CASTSHADOWMESH: u32 = 1 << 29;
    pub const CLIPLIGHT: u32 = 1 << 30;

    const NAMES: &'static [(u32, &'static str)] = &[
        (Self::SOLID, "SOLID"),
        (Self::NONEXISTENT, "NONEXISTENT"),
        (Self::INVISIBLE, "INVISIBLE"),
        (Self::SKY, "SKY"),
        (Self::FLATSHADE, "FLATSHADE"),
        (Self::LIGHTMAP, "LIGHTMAP"),
        (Self::NOSUBDIV, "NOSUBDIV"),
        (Self::PARTICLEBLOCKER, "PARTICLEBLOCKER"),
        (Self::GOURAUDSHADE, "GOURAUDSHADE"),
        (Self::PHYSICSBLOCKER, "PHYSICSBLOCKER"),
        (Self::RBSPLITTER, "RBSPLITTER"),
        (Self::VISBLOCKER, "VISBLOCKER"),
        (Self::NOTASTEP, "NOTASTEP"),
        (Self::RECEIVELIGHT, "RECEIVELIGHT"),
        (Self::RECEIVESHADOWS, "RECEIVESHADOWS"),
        (Self::RECEIVESUNLIGHT, "RECEIVESUNLIGHT"),
        (Self::SHADOWMESH, "SHADOWMESH"),
        (Self::CASTSHADOWMESH, "CASTSHADOWMESH"),
        (Self::CLIPLIGHT, "CLIPLIGHT"),
    ];

    #[must_use]
    pub const fn contains(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    /// Names of the known bits that are set, in bit order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Brush `Type` implied by the flags.
    #[must_use]
    pub const fn brush_type(self) -> &'static str {
        if self.contains(Self::NONEXISTENT) {
            if self.contains(Self::VISBLOCKER) {
                "Occluder"
            } else if self.contains(Self::RBSPLITTER) {
                "RBSplitter"
            } else {
                "RenderOnly"
            }
        } else if !self.contains(Self::SOLID) {
            "NonSolid"
        } else if self.contains(Self::SKY) {
            "SkyPortal"
        } else {
            "Normal"
        }
    }

    /// Brush `Lighting` implied by the flags.
    #[must_use]
    pub const fn lighting(self) -> &'static str {
        lighting_name(self.0)
    }
}

impl fmt::Display for SurfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

/// Lighting mode from raw surface flags.
#[must_use]
pub const fn lighting_name(flags: u32) -> &'static str {
    let flags = SurfaceFlags(flags);
    if flags.contains(SurfaceFlags::SHADOWMESH) && flags.contains(SurfaceFlags::GOURAUDSHADE) {
        "ShadowMesh"
    } else if flags.contains(SurfaceFlags::LIGHTMAP) {
        "Lightmap"
    } else if flags.contains(SurfaceFlags::GOURAUDSHADE) {
        "Gouraud"
    } else if flags.contains(SurfaceFlags::FLATSHADE) {
        "Flat"
    } else {
        "Gouraud"
    }
}

/// Render section shader code as an LTA `Lighting` value.
#[must_use]
pub const fn shader_lighting_name(code: u8) -> &'static str {
    match code {
        0 => "None",
        1 | 8 => "Gouraud",
        2 | 4 | 9 => "Lightmap",
        5 => "Skypan",
        6 => "SkyPortal",
        7 => "Occluder",
        10 => "Splitter",
        _ => "Unknown",
    }
}

/// Render section shader code with the texture stage spelled out.
#[must_use]
pub const fn shader_debug_name(code: u8) -> &'static str {
    match code {
        4 => "Lightmap_Texture",
        8 => "DualTexture",
        9 => "Lightmap_DualTexture",
        other => shader_lighting_name(other),
    }
}
