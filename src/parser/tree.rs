//! Concrete syntax tree
//!
//! Every production the parser runs contributes a node, including the empty
//! alternatives, so the tree mirrors the grammar rather than the program's
//! meaning. The parser only ever builds it; nothing reads it back during
//! parsing.

use super::token::{Token, TokenKind};
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    /// An interior node for one production.
    Node {
        label: &'static str,
        children: Vec<ParseTree>,
    },
    /// A consumed token.
    Leaf {
        kind: TokenKind,
        value: String,
        line: usize,
    },
    /// An empty alternative.
    Empty,
}

impl ParseTree {
    pub fn node(label: &'static str, children: Vec<ParseTree>) -> Self {
        ParseTree::Node { label, children }
    }

    pub fn leaf(token: &Token) -> Self {
        ParseTree::Leaf {
            kind: token.kind,
            value: token.value.clone(),
            line: token.line,
        }
    }

    /// Production label, token kind name, or `null` for an empty alternative.
    pub fn label(&self) -> &str {
        match self {
            ParseTree::Node { label, .. } => *label,
            ParseTree::Leaf { kind, .. } => kind.name(),
            ParseTree::Empty => "null",
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            ParseTree::Leaf { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Node { children, .. } => children.as_slice(),
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ParseTree::Empty)
    }

    /// First node with `label`, depth first.
    pub fn find(&self, label: &str) -> Option<&ParseTree> {
        if self.label() == label {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(label))
    }

    /// Number of nodes with `label` in the whole tree.
    pub fn count(&self, label: &str) -> usize {
        let own = usize::from(self.label() == label);
        own + self.children().iter().map(|child| child.count(label)).sum::<usize>()
    }

    /// Token values of all leaves, in source order.
    pub fn lexemes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_lexemes(&mut out);
        out
    }

    fn collect_lexemes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ParseTree::Leaf { value, .. } => out.push(value.as_str()),
            ParseTree::Node { children, .. } => {
                for child in children {
                    child.collect_lexemes(out);
                }
            }
            ParseTree::Empty => {}
        }
    }
}

/// Serialized as `{"node_type", "value"?, "line"?, "children"?}`.
impl Serialize for ParseTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParseTree::Node { label, children } => {
                let len = if children.is_empty() { 1 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("node_type", label)?;
                if !children.is_empty() {
                    map.serialize_entry("children", children)?;
                }
                map.end()
            }
            ParseTree::Leaf { kind, value, line } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("node_type", kind.name())?;
                map.serialize_entry("value", value)?;
                map.serialize_entry("line", line)?;
                map.end()
            }
            ParseTree::Empty => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("node_type", "null")?;
                map.end()
            }
        }
    }
}
