//! Render attribute defaulting
//!
//! Every render node and world model node must carry `Detail` and
//! `AmbientLight`. Values authored in the source are left alone.

use crate::formats::dat::{PropertyValue, WorldGraph};
use glam::Vec3;

/// Fill in `Detail = false` and `AmbientLight = 0 0 0` where absent.
///
/// Returns how many values were inserted. Running it again inserts nothing.
pub fn apply_defaults(graph: &mut WorldGraph) -> usize {
    let mut inserted = 0;
    for node in graph.all_render_nodes_mut() {
        if node.properties.set_if_absent("Detail", PropertyValue::Bool(false)) {
            inserted += 1;
        }
        if node
            .properties
            .set_if_absent("AmbientLight", PropertyValue::Color(Vec3::ZERO))
        {
            inserted += 1;
        }
    }
    tracing::debug!(inserted, "Applied render attribute defaults");
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dat::{RenderNode, WorldModelNode};

    fn graph() -> WorldGraph {
        let mut authored = RenderNode::default();
        authored
            .properties
            .set("AmbientLight", PropertyValue::Color(Vec3::new(10.0, 20.0, 30.0)));
        WorldGraph {
            render_nodes: vec![RenderNode::default()],
            world_model_nodes: vec![WorldModelNode {
                name: "Door01".into(),
                nodes: vec![authored],
                no_child_flag: 0,
            }],
            ..WorldGraph::default()
        }
    }

    #[test]
    fn test_defaults_fill_missing_only() {
        let mut g = graph();
        assert_eq!(apply_defaults(&mut g), 3);

        let top = &g.render_nodes[0].properties;
        assert_eq!(top.get_bool("Detail"), Some(false));
        assert_eq!(top.get_vec3("AmbientLight"), Some(Vec3::ZERO));

        let wm = &g.world_model_nodes[0].nodes[0].properties;
        assert_eq!(wm.get_vec3("AmbientLight"), Some(Vec3::new(10.0, 20.0, 30.0)));
    }

    #[test]
    fn test_defaults_idempotent() {
        let mut once = graph();
        apply_defaults(&mut once);
        let mut twice = once.clone();
        assert_eq!(apply_defaults(&mut twice), 0);
        assert_eq!(once, twice);
    }
}
