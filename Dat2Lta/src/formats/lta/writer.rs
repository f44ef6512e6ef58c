//! LTA text serialization
//!
//! Brush indices and prop ids are handed out in the same pre-order walk of
//! the node tree that produces the polyhedron list and the global property
//! list, so the three blocks always agree.

use super::document::{
    EditPoly, LtaWorld, NodeKind, Polyhedron, PropData, PropEntry, PropList, TextureInfo,
    WorldNode,
};
use crate::error::{Error, Result};
use glam::Vec3;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Indented s-expression builder that can only emit balanced output.
#[derive(Debug, Default)]
pub struct LtaWriter {
    out: String,
    closers: Vec<&'static str>,
}

impl LtaWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self) {
        for _ in 0..self.closers.len() {
            self.out.push('\t');
        }
    }

    /// `( head` on its own line; closed by [`Self::close`] with `)`.
    pub fn open(&mut self, head: &str) -> Result<()> {
        self.indent();
        writeln!(self.out, "( {head}")?;
        self.closers.push(")");
        Ok(())
    }

    /// `( head (` on its own line; closed by [`Self::close`] with `) )`.
    pub fn open_list(&mut self, head: &str) -> Result<()> {
        self.indent();
        writeln!(self.out, "( {head} (")?;
        self.closers.push(") )");
        Ok(())
    }

    /// Close the innermost open block.
    pub fn close(&mut self) -> Result<()> {
        let closer = self.closers.pop().ok_or_else(|| Error::LtaSyntax {
            line: self.out.lines().count(),
            message: "close without a matching open".to_string(),
        })?;
        self.indent();
        writeln!(self.out, "{closer}")?;
        Ok(())
    }

    /// A complete `( body )` line.
    pub fn item(&mut self, body: &str) -> Result<()> {
        self.indent();
        writeln!(self.out, "( {body} )")?;
        Ok(())
    }

    /// Finished text; fails if any block is still open.
    pub fn finish(self) -> Result<String> {
        if !self.closers.is_empty() {
            return Err(Error::LtaSyntax {
                line: self.out.lines().count(),
                message: format!("{} unclosed block(s)", self.closers.len()),
            });
        }
        Ok(self.out)
    }
}

/// A quoted LTA string. LTA has no escape sequence, so embedded double
/// quotes become single quotes.
#[must_use]
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "'"))
}

/// `x y z` with six decimals.
#[must_use]
pub fn fmt_vec3(v: Vec3) -> String {
    format!("{:.6} {:.6} {:.6}", v.x, v.y, v.z)
}

/// Serialize an LTA world to text
///
/// # Errors
/// Returns an error if formatting fails.
pub fn serialize_lta(world: &LtaWorld) -> Result<String> {
    // One walk decides brush indices and prop ids
    let mut polyhedra: Vec<&Polyhedron> = Vec::new();
    let mut proplists: Vec<&PropList> = Vec::new();
    world.root.visit(&mut |node| match &node.kind {
        NodeKind::Brush {
            polyhedron,
            properties,
        } => {
            polyhedra.push(polyhedron);
            proplists.push(properties);
        }
        NodeKind::Object { properties } => proplists.push(properties),
        NodeKind::Null { .. } => {}
    });

    let mut w = LtaWriter::new();
    w.open("world")?;

    w.open_list("header")?;
    w.item("versioncode 2")?;
    if let Some(info) = &world.info_string {
        w.item(&format!("infostring {}", quoted(info)))?;
    }
    w.close()?;

    w.open_list("polyhedronlist")?;
    for polyhedron in &polyhedra {
        write_polyhedron(&mut w, polyhedron)?;
    }
    w.close()?;

    w.open("nodehierarchy")?;
    let mut counters = Counters::default();
    write_node(&mut w, &world.root, &mut counters)?;
    w.close()?;

    w.open_list("globalproplist")?;
    // Prop id 0 is the empty list used by null nodes
    w.open_list("proplist")?;
    w.close()?;
    for list in &proplists {
        write_proplist(&mut w, list)?;
    }
    w.close()?;

    w.close()?;
    w.finish()
}

/// Serialize and write an LTA world to disk
///
/// # Errors
/// Returns an error if serialization or file writing fails.
pub fn write_lta<P: AsRef<Path>>(world: &LtaWorld, path: P) -> Result<()> {
    let text = serialize_lta(world)?;
    fs::write(path, text)?;
    Ok(())
}

fn write_polyhedron(w: &mut LtaWriter, polyhedron: &Polyhedron) -> Result<()> {
    w.open_list("polyhedron")?;
    w.item("color 255 255 255")?;
    w.open("pointlist")?;
    for point in &polyhedron.points {
        w.item(&format!("{} 255 255 255 255", fmt_vec3(*point)))?;
    }
    w.close()?;
    w.open_list("polylist")?;
    for poly in &polyhedron.polygons {
        write_editpoly(w, poly)?;
    }
    w.close()?;
    w.close()
}

fn write_editpoly(w: &mut LtaWriter, poly: &EditPoly) -> Result<()> {
    w.open("editpoly")?;
    let indices: Vec<String> = poly.indices.iter().map(ToString::to_string).collect();
    w.item(&format!("f {}", indices.join(" ")))?;
    w.item(&format!("n {}", fmt_vec3(poly.normal)))?;
    w.item(&format!("dist {:.6}", poly.dist))?;
    if let Some(textures) = &poly.textures {
        write_texture_info(w, &textures.primary)?;
    }
    w.item("flags")?;
    w.item("shade 0 0 0")?;
    w.item("physicsmaterial \"Default\"")?;
    w.item("surfacekey \"\"")?;
    if let Some(textures) = &poly.textures {
        w.open_list("textures")?;
        w.open_list("1")?;
        write_texture_info(w, &textures.secondary)?;
        w.close()?;
        w.close()?;
    }
    w.close()
}

fn write_texture_info(w: &mut LtaWriter, info: &TextureInfo) -> Result<()> {
    w.open("textureinfo")?;
    w.item(&fmt_vec3(info.origin))?;
    w.item(&fmt_vec3(info.u))?;
    w.item(&fmt_vec3(info.v))?;
    w.item("sticktopoly 1")?;
    w.item(&format!("name {}", quoted(&info.name)))?;
    w.close()
}

#[derive(Debug)]
struct Counters {
    node_id: usize,
    brush_index: usize,
    prop_id: usize,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            node_id: 1,
            brush_index: 0,
            prop_id: 1,
        }
    }
}

/// Node hierarchy in the same pre-order as [`WorldNode::visit`].
fn write_node(w: &mut LtaWriter, root: &WorldNode, counters: &mut Counters) -> Result<()> {
    // (node, children already opened) pairs; explicit stack keeps deep trees off the call stack
    let mut stack: Vec<(&WorldNode, bool)> = vec![(root, false)];
    while let Some((node, opened)) = stack.pop() {
        if opened {
            if !node.children.is_empty() {
                w.close()?;
            }
            w.close()?;
            continue;
        }

        w.open("worldnode")?;
        match &node.kind {
            NodeKind::Null { flags } => {
                w.item("type null")?;
                w.item(&format!("label {}", quoted(&node.label)))?;
                w.item(&format!("nodeid {}", counters.node_id))?;
                if flags.is_empty() {
                    w.item("flags ( )")?;
                } else {
                    w.item(&format!("flags ( {} )", flags.join(" ")))?;
                }
                w.open("properties")?;
                w.item("propid 0")?;
                w.close()?;
            }
            NodeKind::Brush { .. } => {
                w.item("type brush")?;
                w.item(&format!("brushindex {}", counters.brush_index))?;
                w.item(&format!("nodeid {}", counters.node_id))?;
                w.item("flags ( )")?;
                w.open("properties")?;
                w.item(&format!("name {}", quoted(&node.label)))?;
                w.item(&format!("propid {}", counters.prop_id))?;
                w.close()?;
                counters.brush_index += 1;
                counters.prop_id += 1;
            }
            NodeKind::Object { .. } => {
                w.item("type object")?;
                w.item(&format!("label {}", quoted(&node.label)))?;
                w.item(&format!("nodeid {}", counters.node_id))?;
                w.item("flags ( )")?;
                w.open("properties")?;
                w.item(&format!("name {}", quoted(&node.label)))?;
                w.item(&format!("propid {}", counters.prop_id))?;
                w.close()?;
                counters.prop_id += 1;
            }
        }
        counters.node_id += 1;

        stack.push((node, true));
        if !node.children.is_empty() {
            w.open_list("childlist")?;
            for child in node.children.iter().rev() {
                stack.push((child, false));
            }
        }
    }
    Ok(())
}

fn write_proplist(w: &mut LtaWriter, list: &PropList) -> Result<()> {
    w.open_list("proplist")?;
    for entry in &list.entries {
        w.item(&format_entry(entry))?;
    }
    w.close()
}

fn format_entry(entry: &PropEntry) -> String {
    let attributes = if entry.attributes.is_empty() {
        "( )".to_string()
    } else {
        format!("( {} )", entry.attributes.join(" "))
    };
    let head = format!("{} {} {attributes}", entry.keyword, quoted(&entry.name));
    match &entry.data {
        None => head,
        Some(data) => format!("{head} ( data {} )", format_data(data)),
    }
}

fn format_data(data: &PropData) -> String {
    match data {
        PropData::String(s) => quoted(s),
        PropData::Vector(v) | PropData::Color(v) => format!("( vector ({}) )", fmt_vec3(*v)),
        PropData::Rotation(v) => format!("( eulerangles ({}) )", fmt_vec3(*v)),
        PropData::Real(x) | PropData::LongInt(x) => format!("{x:.6}"),
        PropData::Bool(b) => u8::from(*b).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::lta::document::PolyTextures;

    fn triangle(textured: bool) -> Polyhedron {
        Polyhedron {
            points: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            polygons: vec![EditPoly {
                indices: vec![0, 1, 2],
                normal: Vec3::Z,
                dist: 0.0,
                textures: textured.then(|| PolyTextures {
                    primary: TextureInfo::unmapped("tex/wall.dtx"),
                    secondary: TextureInfo::unmapped("Default"),
                }),
            }],
        }
    }

    #[test]
    fn test_writer_rejects_unbalanced() {
        let mut w = LtaWriter::new();
        w.open("world").unwrap();
        assert!(w.finish().is_err());

        let mut w = LtaWriter::new();
        assert!(w.close().is_err());
    }

    #[test]
    fn test_format_entry() {
        let entry = PropEntry::new("LightControl", PropData::LongInt(0.0))
            .with_attributes(&["groupowner", "group1"]);
        assert_eq!(
            format_entry(&entry),
            "longint \"LightControl\" ( groupowner group1 ) ( data 0.000000 )"
        );

        let color =
            PropEntry::new("AmbientLight", PropData::Color(Vec3::ZERO)).with_attributes(&["group1"]);
        assert_eq!(
            format_entry(&color),
            "color \"AmbientLight\" ( group1 ) ( data ( vector (0.000000 0.000000 0.000000) ) )"
        );

        let empty = PropEntry::empty("string", "SoundName");
        assert_eq!(format_entry(&empty), "string \"SoundName\" ( )");
    }

    #[test]
    fn test_serialize_assigns_ids_in_walk_order() {
        let mut world = LtaWorld::new("map", Some("info".to_string()));
        let mut props = PropList::new();
        props.push(PropEntry::new("Name", PropData::String("b".into())));
        world.root.children = vec![
            WorldNode::null("Group").with_children(vec![
                WorldNode::brush(triangle(true), props.clone()),
                WorldNode::brush(triangle(false), props.clone()),
            ]),
        ];

        let text = serialize_lta(&world).unwrap();
        assert!(text.starts_with("( world\n"));
        assert!(text.contains("( infostring \"info\" )"));
        assert!(text.contains("( brushindex 0 )"));
        assert!(text.contains("( brushindex 1 )"));
        assert!(text.contains("( propid 2 )"));
        assert!(text.contains("( flags ( worldroot expanded ) )"));
        assert_eq!(text.matches("( textureinfo").count(), 2);

        let opens = text.matches('(').count();
        let closes = text.matches(')').count();
        assert_eq!(opens, closes);
    }

    #[test]
    fn test_embedded_quotes_stay_inside_one_string() {
        let mut world = LtaWorld::new("map", Some("room \"A\" (north)".to_string()));
        let mut props = PropList::new();
        props.push(PropEntry::new("Name", PropData::String("say \"hi\"".into())));
        world.root.children = vec![WorldNode::object("Light", props)];

        let text = serialize_lta(&world).unwrap();
        assert!(text.contains("( infostring \"room 'A' (north)\" )"));
        assert!(text.contains("( data \"say 'hi'\" )"));

        let nodes = crate::formats::lta::parse_lta(&text).unwrap();
        let infos = nodes[0].find_all("infostring");
        assert_eq!(
            infos[0].children()[1],
            crate::formats::lta::LtaNode::Str("room 'A' (north)".to_string())
        );
    }
}
