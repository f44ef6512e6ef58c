//! LTA text parsing
//!
//! Reads an LTA document back into a generic s-expression tree. Used to
//! check generated output and to report what a file contains.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A parsed LTA node.
#[derive(Debug, Clone, PartialEq)]
pub enum LtaNode {
    /// Bare word or number.
    Atom(String),
    /// Quoted string, without the quotes.
    Str(String),
    List(Vec<LtaNode>),
}

impl LtaNode {
    /// First atom of a list, e.g. `editpoly` for `( editpoly ... )`.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        match self {
            LtaNode::List(items) => match items.first() {
                Some(LtaNode::Atom(a)) => Some(a.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[LtaNode] {
        match self {
            LtaNode::List(items) => items,
            _ => &[],
        }
    }

    /// Depth-first search for lists whose head is `name`.
    #[must_use]
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a LtaNode> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.head() == Some(name) {
                found.push(node);
            }
            stack.extend(node.children().iter().rev());
        }
        found
    }
}

/// Parse LTA text into its top-level nodes
///
/// # Errors
/// Returns [`Error::LtaSyntax`] on unbalanced parentheses or an
/// unterminated string.
pub fn parse_lta(text: &str) -> Result<Vec<LtaNode>> {
    let mut stack: Vec<(usize, Vec<LtaNode>)> = Vec::new();
    let mut top: Vec<LtaNode> = Vec::new();
    let mut line = 1usize;
    let mut chars = text.chars().peekable();

    let push = |stack: &mut Vec<(usize, Vec<LtaNode>)>, top: &mut Vec<LtaNode>, node| {
        match stack.last_mut() {
            Some((_, items)) => items.push(node),
            None => top.push(node),
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '(' => stack.push((line, Vec::new())),
            ')' => {
                let (_, items) = stack.pop().ok_or_else(|| Error::LtaSyntax {
                    line,
                    message: "unexpected ')'".to_string(),
                })?;
                push(&mut stack, &mut top, LtaNode::List(items));
            }
            '"' => {
                let start = line;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            s.push(ch);
                        }
                        None => {
                            return Err(Error::LtaSyntax {
                                line: start,
                                message: "unterminated string".to_string(),
                            });
                        }
                    }
                }
                push(&mut stack, &mut top, LtaNode::Str(s));
            }
            _ => {
                let mut atom = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '(' || next == ')' || next == '"' {
                        break;
                    }
                    atom.push(next);
                    chars.next();
                }
                push(&mut stack, &mut top, LtaNode::Atom(atom));
            }
        }
    }

    if let Some((open_line, _)) = stack.last() {
        return Err(Error::LtaSyntax {
            line: *open_line,
            message: format!("{} unclosed '('", stack.len()),
        });
    }
    Ok(top)
}

/// Read and parse an LTA file
///
/// # Errors
/// Returns an error if the file can't be read or parsed.
pub fn read_lta<P: AsRef<Path>>(path: P) -> Result<Vec<LtaNode>> {
    let text = fs::read_to_string(path)?;
    parse_lta(&text)
}

/// Element counts of an LTA document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LtaStats {
    pub polyhedra: usize,
    pub points: usize,
    pub polygons: usize,
    /// Fan triangulation of every polygon.
    pub triangles: usize,
    pub texture_infos: usize,
    pub world_nodes: usize,
    pub proplists: usize,
}

/// Count the elements of parsed LTA nodes.
#[must_use]
pub fn lta_stats(nodes: &[LtaNode]) -> LtaStats {
    let mut stats = LtaStats::default();
    for node in nodes {
        for polyhedron in node.find_all("polyhedron") {
            stats.polyhedra += 1;
            for pointlist in polyhedron.find_all("pointlist") {
                stats.points += pointlist.children().len().saturating_sub(1);
            }
        }
        for poly in node.find_all("editpoly") {
            stats.polygons += 1;
            let corners = poly
                .find_all("f")
                .first()
                .map_or(0, |f| f.children().len().saturating_sub(1));
            stats.triangles += corners.saturating_sub(2);
        }
        stats.texture_infos += node.find_all("textureinfo").len();
        stats.world_nodes += node.find_all("worldnode").len();
        for global in node.find_all("globalproplist") {
            stats.proplists += global.find_all("proplist").len();
        }
    }
    stats
}
