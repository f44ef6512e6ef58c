//! LTA world document structure definitions
//!
//! A [`LtaWorld`] is a tree of world nodes. Brush nodes own their polyhedron
//! and every brush or object node owns its property list, so the three LTA
//! blocks (polyhedron list, node hierarchy, global property list) are only
//! split apart when the document is serialized.

use glam::Vec3;

/// Texture projection of one polygon: origin plus U and V axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub origin: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub name: String,
}

impl TextureInfo {
    /// Unprojected default: origin at zero, U along +X, V along +Z.
    #[must_use]
    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            origin: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Z,
            name: name.into(),
        }
    }
}

/// Both texture layers of a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyTextures {
    pub primary: TextureInfo,
    pub secondary: TextureInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditPoly {
    /// Indices into the owning polyhedron's points.
    pub indices: Vec<usize>,
    pub normal: Vec3,
    pub dist: f32,
    /// `None` writes the polygon without any texture blocks.
    pub textures: Option<PolyTextures>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyhedron {
    pub points: Vec<Vec3>,
    pub polygons: Vec<EditPoly>,
}

/// Value of one property list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PropData {
    String(String),
    Vector(Vec3),
    Color(Vec3),
    /// Euler angles.
    Rotation(Vec3),
    Real(f32),
    LongInt(f32),
    Bool(bool),
}

impl PropData {
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Color(_) => "color",
            Self::Rotation(_) => "rotation",
            Self::Real(_) => "real",
            Self::LongInt(_) => "longint",
            Self::Bool(_) => "bool",
        }
    }
}

/// One `( type "Name" ( attributes ) ( data ... ) )` line.
#[derive(Debug, Clone, PartialEq)]
pub struct PropEntry {
    /// LTA type keyword; also used when `data` is absent.
    pub keyword: &'static str,
    pub name: String,
    pub attributes: Vec<&'static str>,
    pub data: Option<PropData>,
}

impl PropEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, data: PropData) -> Self {
        Self {
            keyword: data.keyword(),
            name: name.into(),
            attributes: Vec::new(),
            data: Some(data),
        }
    }

    /// An entry declared without a value.
    #[must_use]
    pub fn empty(keyword: &'static str, name: impl Into<String>) -> Self {
        Self {
            keyword,
            name: name.into(),
            attributes: Vec::new(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: &[&'static str]) -> Self {
        self.attributes = attributes.to_vec();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropList {
    pub entries: Vec<PropEntry>,
}

impl PropList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PropEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Grouping node without properties.
    Null { flags: Vec<&'static str> },
    Brush { polyhedron: Polyhedron, properties: PropList },
    Object { properties: PropList },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldNode {
    pub label: String,
    pub kind: NodeKind,
    pub children: Vec<WorldNode>,
}

impl WorldNode {
    #[must_use]
    pub fn null(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Null { flags: Vec::new() },
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn null_with_flags(label: impl Into<String>, flags: &[&'static str]) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Null {
                flags: flags.to_vec(),
            },
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn brush(polyhedron: Polyhedron, properties: PropList) -> Self {
        Self {
            label: "Brush".to_string(),
            kind: NodeKind::Brush {
                polyhedron,
                properties,
            },
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn object(label: impl Into<String>, properties: PropList) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Object { properties },
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<WorldNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first pre-order visit of this node and its descendants.
    pub fn visit<'a>(&'a self, visit: &mut impl FnMut(&'a WorldNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            stack.extend(node.children.iter().rev());
        }
    }
}

/// A complete LTA world.
#[derive(Debug, Clone, PartialEq)]
pub struct LtaWorld {
    pub info_string: Option<String>,
    pub root: WorldNode,
}

impl LtaWorld {
    #[must_use]
    pub fn new(root_label: impl Into<String>, info_string: Option<String>) -> Self {
        Self {
            info_string,
            root: WorldNode::null_with_flags(root_label, &["worldroot", "expanded"]),
        }
    }

    /// Brush polyhedra in brush-index order.
    #[must_use]
    pub fn polyhedra(&self) -> Vec<&Polyhedron> {
        let mut out = Vec::new();
        self.root.visit(&mut |node| {
            if let NodeKind::Brush { polyhedron, .. } = &node.kind {
                out.push(polyhedron);
            }
        });
        out
    }

    /// Property lists in prop-id order (ids start at 1).
    #[must_use]
    pub fn proplists(&self) -> Vec<&PropList> {
        let mut out = Vec::new();
        self.root.visit(&mut |node| match &node.kind {
            NodeKind::Brush { properties, .. } | NodeKind::Object { properties } => {
                out.push(properties);
            }
            NodeKind::Null { .. } => {}
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> PropList {
        let mut list = PropList::new();
        list.push(PropEntry::new("Name", PropData::String(name.to_string())));
        list
    }

    #[test]
    fn test_traversal_order_is_pre_order() {
        let mut world = LtaWorld::new("map", None);
        world.root.children = vec![
            WorldNode::null("A").with_children(vec![
                WorldNode::brush(Polyhedron::default(), named("b0")),
                WorldNode::brush(Polyhedron::default(), named("b1")),
            ]),
            WorldNode::object("Light", named("light")).with_children(vec![WorldNode::brush(
                Polyhedron::default(),
                named("b2"),
            )]),
        ];

        let names: Vec<&str> = world
            .proplists()
            .iter()
            .filter_map(|p| match p.get("Name")?.data.as_ref()? {
                PropData::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["b0", "b1", "light", "b2"]);
        assert_eq!(world.polyhedra().len(), 3);
    }

    #[test]
    fn test_unmapped_texture_info() {
        let info = TextureInfo::unmapped("Default");
        assert_eq!(info.u, Vec3::X);
        assert_eq!(info.v, Vec3::Z);
    }
}
