//! Arena of containers addressed by handles.
//!
//! Owned [`Value`] trees cannot share or contain themselves. A [`Graph`] stores
//! arrays and objects in an arena and links them by [`NodeId`], so the same
//! container can appear under several parents (a diamond) or under itself (a
//! cycle). The canonicalizer detects cycles by comparing handles.

use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Handle to a container stored in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    kind: NodeKind,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NodeKind {
    Array,
    Object,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Array => write!(f, "array#{}", self.index),
            NodeKind::Object => write!(f, "object#{}", self.index),
        }
    }
}

/// Slot content of a graph container: an owned value or a link to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Owned value; may itself be a (tree-shaped) container.
    Value(Value),
    /// Link to another container of the same graph.
    Node(NodeId),
}

impl Item {
    pub(crate) fn is_omitted(&self) -> bool {
        matches!(self, Item::Value(Value::Omitted))
    }
}

impl From<NodeId> for Item {
    fn from(id: NodeId) -> Self {
        Item::Node(id)
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Value(value)
    }
}

macro_rules! item_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Item {
                fn from(value: $ty) -> Self {
                    Item::Value(Value::from(value))
                }
            }
        )*
    };
}

item_from_scalar!(bool, i32, i64, u32, u64, f64, &str, String);

/// Borrowed view of a container.
pub(crate) enum Node<'g> {
    Array(&'g [Item]),
    Object(&'g [(String, Item)]),
}

/// Arena holding arrays and objects that may reference each other.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    arrays: Vec<Vec<Item>>,
    objects: Vec<Vec<(String, Item)>>,
}

impl Graph {
    /// Creates an empty graph.
    pub const fn new() -> Self {
        Self {
            arrays: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Allocates an empty array and returns its handle.
    pub fn array(&mut self) -> NodeId {
        self.arrays.push(Vec::new());
        NodeId {
            kind: NodeKind::Array,
            index: self.arrays.len() - 1,
        }
    }

    /// Allocates an empty object and returns its handle.
    pub fn object(&mut self) -> NodeId {
        self.objects.push(Vec::new());
        NodeId {
            kind: NodeKind::Object,
            index: self.objects.len() - 1,
        }
    }

    /// Appends `item` to the array `array`.
    pub fn push(&mut self, array: NodeId, item: impl Into<Item>) -> Result<()> {
        let slots = match array.kind {
            NodeKind::Array => self.arrays.get_mut(array.index),
            NodeKind::Object => None,
        }
        .ok_or_else(|| unknown(array, "array"))?;
        slots.push(item.into());
        Ok(())
    }

    /// Sets `key` of the object `object`. An existing key keeps its position.
    pub fn insert(
        &mut self,
        object: NodeId,
        key: impl Into<String>,
        item: impl Into<Item>,
    ) -> Result<()> {
        let entries = match object.kind {
            NodeKind::Object => self.objects.get_mut(object.index),
            NodeKind::Array => None,
        }
        .ok_or_else(|| unknown(object, "object"))?;
        let key = key.into();
        let item = item.into();
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = item,
            None => entries.push((key, item)),
        }
        Ok(())
    }

    /// Number of containers in the arena.
    pub fn len(&self) -> usize {
        self.arrays.len() + self.objects.len()
    }

    /// Returns `true` when no container has been allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<Node<'_>> {
        match id.kind {
            NodeKind::Array => self
                .arrays
                .get(id.index)
                .map(|items| Node::Array(items))
                .ok_or_else(|| unknown(id, "array")),
            NodeKind::Object => self
                .objects
                .get(id.index)
                .map(|entries| Node::Object(entries))
                .ok_or_else(|| unknown(id, "object")),
        }
    }
}

fn unknown(id: NodeId, expected: &str) -> Error {
    Error::UnsupportedValue(format!("{id} is not an {expected} of this graph"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_key_in_place() {
        let mut graph = Graph::new();
        let obj = graph.object();
        graph.insert(obj, "a", 1).unwrap();
        graph.insert(obj, "b", 2).unwrap();
        graph.insert(obj, "a", 3).unwrap();
        match graph.node(obj).unwrap() {
            Node::Object(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0], ("a".to_string(), Item::Value(Value::from(3))));
            }
            Node::Array(_) => panic!("expected object"),
        }
    }

    #[test]
    fn handles_of_the_wrong_kind_are_rejected() {
        let mut graph = Graph::new();
        let arr = graph.array();
        let obj = graph.object();
        assert!(matches!(graph.insert(arr, "a", 1), Err(Error::UnsupportedValue(_))));
        assert!(matches!(graph.push(obj, 1), Err(Error::UnsupportedValue(_))));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn handles_from_another_graph_are_rejected() {
        let mut other = Graph::new();
        other.array();
        let foreign = other.array();
        let graph = Graph::new();
        assert!(graph.node(foreign).is_err());
    }
}
