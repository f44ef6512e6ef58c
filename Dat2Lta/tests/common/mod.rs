//! Synthetic DAT v85 buffers for the integration tests

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use dat2lta::formats::dat::{BLIND_ID_KEYFRAMER, BLIND_ID_SCATTER_VOLUME};
use dat2lta::formats::hash_name_ic;

type Buf = Vec<u8>;

const HEADER_WORDS: usize = 15;

/// Header word index of each section offset.
const OBJECTS: usize = 1;
const BLIND_OBJECTS: usize = 2;
const COLLISION: usize = 4;
const PARTICLE_BLOCKERS: usize = 5;
const RENDER_DATA: usize = 6;

/// Id of the opaque blind object written with `blind_objects`.
pub const OPAQUE_BLIND_ID: u32 = 7;

const SOLID: u32 = 1 << 0;
const LIGHTMAP: u32 = 1 << 7;
const NOTASTEP: u32 = 1 << 22;

const QUAD: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [64.0, 0.0, 0.0],
    [64.0, 64.0, 0.0],
    [0.0, 64.0, 0.0],
];

const DOOR: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [0.0, 0.0, 64.0], [32.0, 0.0, 64.0]];

/// One world model of the world tree; every polygon is a triangle on `plane`.
struct ModelSpec {
    name: &'static str,
    points: &'static [[f32; 3]],
    polygons: &'static [[u32; 3]],
    plane: ([f32; 3], f32),
    flags: u32,
    texture: &'static [u8],
}

const MAIN_MODEL: ModelSpec = ModelSpec {
    name: "PhysicsBSP",
    points: &QUAD,
    polygons: &[[0, 1, 2], [0, 2, 3]],
    plane: ([0.0, 0.0, 1.0], 0.0),
    flags: SOLID | LIGHTMAP | NOTASTEP,
    texture: b"tex/wall.dtx\0",
};

const DOOR_MODEL: ModelSpec = ModelSpec {
    name: "Door01",
    points: &DOOR,
    polygons: &[[0, 1, 2]],
    plane: ([0.0, 1.0, 0.0], 0.0),
    flags: SOLID,
    texture: b"tex/door.dtx\0",
};

/// A one-room world: the `PhysicsBSP` world model holds one quad brush,
/// one render node draws it as two triangles with `TextureEffect` `Glass01`
/// and carries a single occluder.
///
/// The switches add the optional sections:
/// - `world_model`: a `Door01` world model, the `Door` object placing it and
///   its world model render node
/// - `blind_objects`: a KeyFramer path (named by a `KeyFramer` object), a
///   second unnamed path, a ScatterVolume and an opaque blob
/// - `blockers`: one collision polygon and one particle blocker
#[derive(Debug, Clone, Default)]
pub struct SyntheticDat {
    /// Write 68-byte (`v1`) instead of 44-byte (`v2`) vertices.
    pub with_tangents: bool,
    /// Name stored (as a hash) on the occluder; `None` hashes `Occluder`.
    pub occluder_name: Option<String>,
    /// Adds a `DynamicOccluderVolume` object naming the occluder.
    pub name_occluder_in_objects: bool,
    pub world_model: bool,
    pub blind_objects: bool,
    pub blockers: bool,
    /// World offset stored in the world info.
    pub offset: [f32; 3],
}

impl SyntheticDat {
    pub fn build(&self) -> Vec<u8> {
        let mut data: Buf = vec![0u8; HEADER_WORDS * 4];
        let mut header = [0u32; HEADER_WORDS];
        header[0] = 85;

        write_world_info(&mut data, self.offset);
        self.write_world_tree(&mut data);

        header[OBJECTS] = pos(&data);
        self.write_objects(&mut data);

        header[BLIND_OBJECTS] = pos(&data);
        self.write_blind_objects(&mut data);

        header[COLLISION] = pos(&data);
        if self.blockers {
            put_u32(&mut data, 1);
            let wall = [[64.0, 0.0, 0.0], [64.0, 64.0, 0.0], [64.0, 64.0, 64.0], [64.0, 0.0, 64.0]];
            put_blocker(&mut data, [1.0, 0.0, 0.0], 64.0, &wall);
        } else {
            put_u32(&mut data, 0);
        }

        header[PARTICLE_BLOCKERS] = pos(&data);
        if self.blockers {
            put_u32(&mut data, 1);
            let ceiling = QUAD.map(|[x, y, _]| [x, y, 32.0]);
            put_blocker(&mut data, [0.0, 0.0, 1.0], 32.0, &ceiling);
        } else {
            put_u32(&mut data, 0);
        }

        header[RENDER_DATA] = pos(&data);
        self.write_render_data(&mut data);

        for (index, word) in header.iter().enumerate() {
            data[index * 4..index * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        data
    }

    fn occluder_name(&self) -> &str {
        self.occluder_name.as_deref().unwrap_or("Occluder")
    }

    fn write_world_tree(&self, data: &mut Buf) {
        put_vec3(data, [0.0, 0.0, 0.0]);
        put_vec3(data, [64.0, 64.0, 128.0]);
        // one branch with four leaves
        put_u32(data, 5);
        put_u32(data, 0);
        put_u8(data, 0b0000_0001);

        if self.world_model {
            put_u32(data, 2);
            write_world_model(data, &MAIN_MODEL);
            write_world_model(data, &DOOR_MODEL);
        } else {
            put_u32(data, 1);
            write_world_model(data, &MAIN_MODEL);
        }
    }

    fn write_objects(&self, data: &mut Buf) {
        let count = 1
            + u32::from(self.name_occluder_in_objects)
            + u32::from(self.world_model)
            + 2 * u32::from(self.blind_objects);
        put_u32(data, count);

        // Light01: name and position
        put_u16(data, 64);
        put_string(data, "Light");
        put_u32(data, 3);
        string_prop(data, "Name", "Light01");
        prop_header(data, "Pos", 1, 12);
        put_vec3(data, [32.0, 32.0, 48.0]);
        prop_header(data, "LightRadius", 3, 4);
        put_f32(data, 300.0);

        if self.name_occluder_in_objects {
            let name = self.occluder_name().to_string();
            put_u16(data, 64);
            put_string(data, "DynamicOccluderVolume");
            put_u32(data, 2);
            string_prop(data, "Name", "Volume01");
            string_prop(data, "OccluderName0", &name);
        }

        if self.world_model {
            // authored ambient light, no Detail
            put_u16(data, 64);
            put_string(data, "Door");
            put_u32(data, 2);
            string_prop(data, "Name", "Door01");
            prop_header(data, "AmbientLight", 2, 12);
            put_vec3(data, [0.25, 0.25, 0.25]);
        }

        if self.blind_objects {
            put_u16(data, 64);
            put_string(data, "KeyFramer");
            put_u32(data, 2);
            string_prop(data, "Name", "KeyFramer0");
            string_prop(data, "BaseKeyName", "DoorKey");

            put_u16(data, 64);
            put_string(data, "ScatterVolume");
            put_u32(data, 1);
            string_prop(data, "Name", "Grass01");
        }
    }

    fn write_blind_objects(&self, data: &mut Buf) {
        if !self.blind_objects {
            put_u32(data, 0);
            return;
        }
        put_u32(data, 4);

        // DoorKey: a plain key, then a key with a sound and both tangents
        let mut path = Buf::new();
        put_u32(&mut path, 2);
        put_key(&mut path, 0, [16.0, 0.0, 0.0], 0.0, "", None);
        put_key(
            &mut path,
            3,
            [48.0, 0.0, 0.0],
            2.0,
            "door.wav",
            Some(([-8.0, 0.0, 0.0], [8.0, 0.0, 0.0])),
        );
        put_blind(data, BLIND_ID_KEYFRAMER, &path);

        // a path no KeyFramer object names
        let mut orphan = Buf::new();
        put_u32(&mut orphan, 1);
        put_key(&mut orphan, 0, [0.0, 0.0, 0.0], 0.0, "", None);
        put_blind(data, BLIND_ID_KEYFRAMER, &orphan);

        // Grass01: one volume with two particles
        let mut scatter = Buf::new();
        put_u32(&mut scatter, 1);
        put_vec3(&mut scatter, [32.0, 32.0, 0.0]);
        put_vec3(&mut scatter, [16.0, 16.0, 4.0]);
        put_u32(&mut scatter, 2);
        for (x, color) in [(24.0, 0xFF00_FF00), (40.0, 0xFF80_8080)] {
            put_vec3(&mut scatter, [x, 32.0, 0.0]);
            put_u32(&mut scatter, color);
            put_f32(&mut scatter, 1.5);
            put_u8(&mut scatter, 10);
            put_u8(&mut scatter, 20);
        }
        put_blind(data, BLIND_ID_SCATTER_VOLUME, &scatter);

        put_blind(data, OPAQUE_BLIND_ID, &[1, 2, 3, 4]);
    }

    fn write_render_data(&self, data: &mut Buf) {
        put_u32(data, 1);
        put_vec3(data, [32.0, 32.0, 0.0]);
        put_vec3(data, [32.0, 32.0, 1.0]);

        // one section, two triangles
        put_u32(data, 1);
        put_section(data, "tex/wall.dtx", 2, "Glass01");

        put_u32(data, 4);
        for point in QUAD {
            put_vertex(data, point, [point[0] / 64.0, point[1] / 64.0], [0.0, 0.0, 1.0], self.with_tangents);
        }

        put_u32(data, 2);
        for (indices, polygon) in [([0, 1, 2], 0), ([0, 2, 3], 1)] {
            for index in indices {
                put_u32(data, index);
            }
            put_u32(data, polygon);
        }

        // no sky portals, one occluder
        put_u32(data, 0);
        put_u32(data, 1);
        put_u8(data, 4);
        for point in QUAD {
            put_vec3(data, [point[0], point[1], 128.0]);
        }
        put_vec3(data, [0.0, 0.0, 1.0]);
        put_f32(data, 128.0);
        put_u32(data, hash_name_ic(self.occluder_name()));

        // no light groups, child flags and links
        put_u32(data, 0);
        put_u8(data, 0);
        put_u32(data, 0);
        put_u32(data, 0);

        if self.world_model {
            self.write_door_node(data);
        } else {
            put_u32(data, 0);
        }

        // world light groups
        put_u32(data, 0);
    }

    /// `Door01` render node: one sub-node drawing the door triangle.
    fn write_door_node(&self, data: &mut Buf) {
        put_u32(data, 1);
        put_string(data, "Door01");
        put_u32(data, 1);

        put_vec3(data, [16.0, 0.0, 32.0]);
        put_vec3(data, [16.0, 0.0, 32.0]);
        put_u32(data, 1);
        put_section(data, "tex/door.dtx", 1, "");

        put_u32(data, 3);
        for point in DOOR {
            put_vertex(data, point, [point[0] / 32.0, point[2] / 64.0], [0.0, 1.0, 0.0], self.with_tangents);
        }
        put_u32(data, 1);
        for index in [0, 1, 2, 0] {
            put_u32(data, index);
        }

        // no portals, occluders or light groups; child flags and links
        put_u32(data, 0);
        put_u32(data, 0);
        put_u32(data, 0);
        put_u8(data, 3);
        put_u32(data, 7);
        put_u32(data, 9);

        // no-child flag
        put_u32(data, 1);
    }
}

fn write_world_info(data: &mut Buf, offset: [f32; 3]) {
    let info = "synthetic room";
    put_u32(data, info.len() as u32);
    data.extend_from_slice(info.as_bytes());
    put_vec3(data, [0.0, 0.0, 0.0]);
    put_vec3(data, [64.0, 64.0, 128.0]);
    put_vec3(data, offset);
}

fn write_world_model(data: &mut Buf, model: &ModelSpec) {
    put_u32(data, 0);
    put_u32(data, 0);
    put_string(data, model.name);
    let polygons = model.polygons.len() as u32;
    // points, planes, surfaces, portals, polygons, leaves, poly vertices,
    // visible lists, leaf lists, nodes
    for count in [model.points.len() as u32, 1, 1, 0, polygons, 0, 3 * polygons, 0, 0, 0] {
        put_u32(data, count);
    }

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for point in model.points {
        for axis in 0..3 {
            min[axis] = min[axis].min(point[axis]);
            max[axis] = max[axis].max(point[axis]);
        }
    }
    put_vec3(data, min);
    put_vec3(data, max);
    put_vec3(data, [0.0, 0.0, 0.0]);
    put_u32(data, model.texture.len() as u32);
    put_u32(data, 1);
    data.extend_from_slice(model.texture);

    // vertex count per polygon
    for _ in model.polygons {
        put_u8(data, 3);
    }

    put_vec3(data, model.plane.0);
    put_f32(data, model.plane.1);

    put_u32(data, model.flags);
    put_u16(data, 0);
    put_u16(data, 0);

    for indices in model.polygons {
        put_u32(data, 0);
        put_u32(data, 0);
        for &index in indices {
            put_u32(data, index);
        }
    }

    for &point in model.points {
        put_vec3(data, point);
    }
    data.write_i32::<LittleEndian>(-1).unwrap();
    put_u32(data, 0);
}

fn put_section(data: &mut Buf, texture: &str, triangles: u32, effect: &str) {
    put_string(data, texture);
    put_string(data, "");
    put_u8(data, 4);
    put_u32(data, triangles);
    put_string(data, effect);
    // no lightmap
    put_u32(data, 0);
    put_u32(data, 0);
    put_u32(data, 0);
}

fn put_vertex(data: &mut Buf, position: [f32; 3], uv: [f32; 2], normal: [f32; 3], with_tangents: bool) {
    put_vec3(data, position);
    put_f32(data, uv[0]);
    put_f32(data, uv[1]);
    put_f32(data, 0.0);
    put_f32(data, 0.0);
    data.extend_from_slice(&[255, 255, 255, 255]);
    put_vec3(data, normal);
    if with_tangents {
        put_vec3(data, [1.0, 0.0, 0.0]);
        put_vec3(data, [0.0, 1.0, 0.0]);
    }
}

fn put_key(
    data: &mut Buf,
    key_type: u16,
    position: [f32; 3],
    timestamp: f32,
    sound: &str,
    tangents: Option<([f32; 3], [f32; 3])>,
) {
    put_u16(data, key_type);
    put_u8(data, sound.len() as u8);
    put_u8(data, 0);
    put_vec3(data, position);
    put_vec3(data, [0.0, 90.0, 0.0]);
    put_f32(data, timestamp);
    put_f32(data, if sound.is_empty() { 0.0 } else { 100.0 });
    data.extend_from_slice(sound.as_bytes());
    if let Some((prev, next)) = tangents {
        put_vec3(data, prev);
        put_vec3(data, next);
    }
}

fn put_blind(data: &mut Buf, id: u32, payload: &[u8]) {
    put_u32(data, payload.len() as u32);
    put_u32(data, id);
    data.extend_from_slice(payload);
}

fn put_blocker(data: &mut Buf, normal: [f32; 3], dist: f32, vertices: &[[f32; 3]]) {
    put_vec3(data, normal);
    put_f32(data, dist);
    put_u32(data, vertices.len() as u32);
    for &vertex in vertices {
        put_vec3(data, vertex);
    }
}

fn prop_header(data: &mut Buf, name: &str, kind: u8, size: u16) {
    put_string(data, name);
    put_u8(data, kind);
    put_u32(data, 0);
    put_u16(data, size);
}

fn string_prop(data: &mut Buf, name: &str, value: &str) {
    prop_header(data, name, 0, 2 + value.len() as u16);
    put_string(data, value);
}

fn pos(data: &Buf) -> u32 {
    data.len() as u32
}

fn put_u8(data: &mut Buf, value: u8) {
    data.write_u8(value).unwrap();
}

fn put_u16(data: &mut Buf, value: u16) {
    data.write_u16::<LittleEndian>(value).unwrap();
}

fn put_u32(data: &mut Buf, value: u32) {
    data.write_u32::<LittleEndian>(value).unwrap();
}

fn put_f32(data: &mut Buf, value: f32) {
    data.write_f32::<LittleEndian>(value).unwrap();
}

fn put_vec3(data: &mut Buf, v: [f32; 3]) {
    for c in v {
        put_f32(data, c);
    }
}

fn put_string(data: &mut Buf, s: &str) {
    put_u16(data, s.len() as u16);
    data.extend_from_slice(s.as_bytes());
}
