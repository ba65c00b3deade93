use std::fmt;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::graph::{Graph, Item, Node, NodeId};
use crate::keys::sorted_entries;
use crate::value::{Map, Value};

/// Default maximum container nesting, matching serde_json's parser limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

static EMPTY_GRAPH: Graph = Graph::new();

/// Resource limits applied while canonicalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of nested containers on any path from the root.
    pub max_depth: usize,
}

impl Limits {
    /// Limits with the given maximum depth.
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Canonicalizer that rebuilds values with sorted keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalizer {
    limits: Limits,
}

impl Canonicalizer {
    /// Creates a canonicalizer enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// Returns the configured limits.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Returns a sorted deep copy of `value`. Scalars come back unchanged.
    pub fn canonicalize(&self, value: &Value) -> Result<Value> {
        trace!(max_depth = self.limits.max_depth, "canonicalizing value");
        Walk::new(&EMPTY_GRAPH, self.limits).value(value)
    }

    /// Returns a sorted tree for the container `root` of `graph`.
    ///
    /// Fails with [`Error::CircularReference`] if a container is reached again
    /// while it is still being visited. Containers shared by separate branches
    /// are copied once per branch.
    pub fn canonicalize_graph(&self, graph: &Graph, root: NodeId) -> Result<Value> {
        trace!(nodes = graph.len(), %root, "canonicalizing graph");
        Walk::new(graph, self.limits).node(root)
    }
}

/// Returns a sorted deep copy of `value` using default limits.
pub fn canonicalize(value: &Value) -> Result<Value> {
    Canonicalizer::default().canonicalize(value)
}

/// Location inside the value being walked, for error messages.
#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

#[derive(Debug, Default)]
struct Path<'a> {
    segments: Vec<Segment<'a>>,
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// State of one top-level canonicalization call.
struct Walk<'a> {
    graph: &'a Graph,
    limits: Limits,
    /// Graph containers on the current path, innermost last.
    visiting: Vec<NodeId>,
    path: Path<'a>,
    depth: usize,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a Graph, limits: Limits) -> Self {
        Self {
            graph,
            limits,
            visiting: Vec::new(),
            path: Path::default(),
            depth: 0,
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            let path = self.path.to_string();
            debug!(limit = self.limits.max_depth, %path, "nesting too deep");
            return Err(Error::DepthLimitExceeded {
                limit: self.limits.max_depth,
                path,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn value(&mut self, value: &'a Value) -> Result<Value> {
        match value {
            Value::Array(items) => {
                self.enter()?;
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    self.path.segments.push(Segment::Index(index));
                    out.push(self.value(item)?);
                    self.path.segments.pop();
                }
                self.leave();
                Ok(Value::Array(out))
            }
            Value::Object(map) => {
                self.enter()?;
                let mut out = Map::with_capacity(map.len());
                for (key, child) in sorted_entries(map.iter(), Value::is_omitted) {
                    self.path.segments.push(Segment::Field(key));
                    out.insert(key.to_owned(), self.value(child)?);
                    self.path.segments.pop();
                }
                self.leave();
                Ok(Value::Object(out))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn item(&mut self, item: &'a Item) -> Result<Value> {
        match item {
            Item::Value(value) => self.value(value),
            Item::Node(id) => self.node(*id),
        }
    }

    fn node(&mut self, id: NodeId) -> Result<Value> {
        if self.visiting.contains(&id) {
            let path = self.path.to_string();
            debug!(node = %id, %path, "circular reference");
            return Err(Error::CircularReference { path });
        }
        let node = self.graph.node(id)?;
        self.enter()?;
        self.visiting.push(id);
        let out = match node {
            Node::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    self.path.segments.push(Segment::Index(index));
                    out.push(self.item(item)?);
                    self.path.segments.pop();
                }
                Value::Array(out)
            }
            Node::Object(entries) => {
                let mut out = Map::with_capacity(entries.len());
                let sorted = sorted_entries(entries.iter().map(|(k, v)| (k, v)), Item::is_omitted);
                for (key, child) in sorted {
                    self.path.segments.push(Segment::Field(key));
                    out.insert(key.to_owned(), self.item(child)?);
                    self.path.segments.pop();
                }
                Value::Object(out)
            }
        };
        self.visiting.pop();
        self.leave();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keys;
    use serde_json::json;

    fn key_order(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn sorts_nested_keys() {
        let value = Value::from(json!({"b": 1, "a": {"d": 2, "c": 3}}));
        let canonical = canonicalize(&value).unwrap();
        assert_eq!(key_order(&canonical), vec!["a", "b"]);
        assert_eq!(key_order(canonical.get("a").unwrap()), vec!["c", "d"]);
    }

    #[test]
    fn scalars_pass_through() {
        for scalar in [
            Value::Null,
            Value::Bool(false),
            Value::from(1.5),
            Value::from("x"),
            Value::Omitted,
        ] {
            assert_eq!(canonicalize(&scalar).unwrap(), scalar);
        }
    }

    #[test]
    fn omitted_entries_are_dropped_from_objects_only() {
        let value = Value::object([
            ("a", Value::Omitted),
            ("b", Value::Array(vec![Value::Omitted])),
        ]);
        let canonical = canonicalize(&value).unwrap();
        assert_eq!(key_order(&canonical), vec!["b"]);
        assert_eq!(canonical.get("b"), Some(&Value::Array(vec![Value::Omitted])));
    }

    #[test]
    fn input_is_left_untouched() {
        let value = Value::from(json!({"z": [{"y": 1, "x": 2}], "a": null}));
        let before = value.clone();
        canonicalize(&value).unwrap();
        assert_eq!(key_order(&value), vec!["z", "a"]);
        assert_eq!(value, before);
    }

    #[test]
    fn depth_limit_reports_path() {
        let value = Value::from(json!({"a": [{"b": []}]}));
        let err = Canonicalizer::new(Limits::new(3)).canonicalize(&value).unwrap_err();
        assert_eq!(
            err,
            Error::DepthLimitExceeded {
                limit: 3,
                path: "root.a[0].b".into()
            }
        );
        assert!(Canonicalizer::new(Limits::new(4)).canonicalize(&value).is_ok());
    }

    #[test]
    fn graph_self_reference_is_circular() {
        let mut graph = Graph::new();
        let obj = graph.object();
        graph.insert(obj, "name", "m").unwrap();
        graph.insert(obj, "self", obj).unwrap();
        let err = Canonicalizer::default().canonicalize_graph(&graph, obj).unwrap_err();
        assert_eq!(err, Error::CircularReference { path: "root.self".into() });
    }

    #[test]
    fn graph_diamond_is_copied_per_branch() {
        let mut graph = Graph::new();
        let shared = graph.object();
        graph.insert(shared, "v", 1).unwrap();
        let root = graph.object();
        graph.insert(root, "right", shared).unwrap();
        graph.insert(root, "left", shared).unwrap();
        let canonical = Canonicalizer::default().canonicalize_graph(&graph, root).unwrap();
        assert_eq!(keys(canonical.as_object().unwrap()), vec!["left", "right"]);
        assert_eq!(canonical.get("left"), canonical.get("right"));
    }
}
