//! Physics-only LTA scene
//!
//! The world tree's brushes, one null node per world model. Polygons carry
//! no texture blocks and brushes never carry `TextureEffect`; the rest of
//! each brush's surface properties is kept so it can be copied by hand into
//! the main file.

use super::proplist::{BrushProps, brush_proplist};
use crate::formats::dat::{Brush, WorldGraph, WorldModel};
use crate::formats::lta::{EditPoly, LtaWorld, Polyhedron, WorldNode};
use glam::Vec3;
use std::collections::HashMap;

/// Suffix of the physics file and its root node.
pub const PHYSICS_SUFFIX: &str = "_PhysicsDATA";

/// Build the physics LTA world for `graph`.
#[must_use]
pub fn build_physics_lta(graph: &WorldGraph, map_name: &str) -> LtaWorld {
    let offset = graph.info.offset;
    let mut world = LtaWorld::new(format!("{map_name}{PHYSICS_SUFFIX}"), None);

    world.root.children = graph
        .tree
        .world_models
        .iter()
        .enumerate()
        .map(|(model_index, model)| {
            let brushes = graph
                .brushes
                .iter()
                .filter(|brush| brush.world_model == model_index)
                .map(|brush| physics_brush(model, brush, offset))
                .collect();
            WorldNode::null(&model.name).with_children(brushes)
        })
        .collect();
    world
}

fn physics_brush(model: &WorldModel, brush: &Brush, offset: Vec3) -> WorldNode {
    let mut local: HashMap<u32, usize> = HashMap::new();
    let mut polyhedron = Polyhedron::default();

    for polygon in brush.polygons.iter().filter_map(|&p| model.polygons.get(p)) {
        let Some(plane) = model.planes.get(polygon.plane as usize) else {
            continue;
        };
        let mut indices = Vec::with_capacity(polygon.indices.len());
        for &point in &polygon.indices {
            let Some(position) = model.points.get(point as usize) else {
                continue;
            };
            let index = *local.entry(point).or_insert_with(|| {
                polyhedron.points.push(*position + offset);
                polyhedron.points.len() - 1
            });
            indices.push(index);
        }
        polyhedron.polygons.push(EditPoly {
            indices,
            normal: plane.normal,
            dist: plane.dist + plane.normal.dot(offset),
            textures: None,
        });
    }

    let props = &brush.properties;
    let name = props.get_str("Name").unwrap_or("Surface");
    let brush_type = props.get_str("Type").unwrap_or("Normal");
    let lighting = props.get_str("Lighting").unwrap_or("Gouraud");
    let list = brush_proplist(
        &BrushProps::new(name, brush_type, lighting)
            .with_not_a_step(props.get_bool("NotAStep").unwrap_or(false))
            .with_attributes(props),
    );
    WorldNode::brush(polyhedron, list)
}
