//! The dynamic value tree produced by parsing and consumed by stringifying.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

/// The mapping representation used throughout the crate.
///
/// Insertion order is preserved so that output generated from a parsed tree
/// is deterministic.
pub type Map = IndexMap<String, Node>;

/// A parsed querystring value.
///
/// Every querystring parses to a tree of these. The root returned by
/// [`parse`](crate::parse()) is always a `Mapping`, since the wire format
/// needs a key to group values by.
///
/// - `Mapping`: nested objects like `user[name]=John&user[age]=30`
/// - `Sequence`: arrays like `ids[]=1&ids[]=2`
/// - `Scalar`: leaf values; `Scalar(None)` is an *absent* value, i.e. a
///   bare key with no `=` parsed under strict-null handling
#[derive(Clone, PartialEq)]
pub enum Node {
    Scalar(Option<String>),
    Sequence(Vec<Node>),
    Mapping(Map),
}

impl Node {
    /// A leaf with no value at all, e.g. the bare key in `"flag&a=1"`.
    pub fn absent() -> Self {
        Node::Scalar(None)
    }

    /// Whether this leaf is an empty or absent value. Used to admit empty
    /// arrays (`a[]=`) when the option is enabled.
    pub(crate) fn is_empty_value(&self) -> bool {
        match self {
            Node::Scalar(None) => true,
            Node::Scalar(Some(s)) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether `map` addresses sequence elements by index.
    ///
    /// Only the single-character digit keys `"0".."9"` are recognized, and
    /// they must form a contiguous run starting at zero (in any encounter
    /// order). Keys of `"10"` and above are treated as ordinary mapping
    /// entries rather than extending a sequence; this mirrors the wire
    /// behavior this crate is compatible with and is kept as a documented
    /// limitation.
    pub fn is_index_mapping(map: &Map) -> bool {
        if map.is_empty() || map.len() > 10 {
            return false;
        }
        let mut seen = [false; 10];
        for key in map.keys() {
            match key.as_bytes() {
                [digit @ b'0'..=b'9'] => {
                    let index = (digit - b'0') as usize;
                    if index >= map.len() || seen[index] {
                        return false;
                    }
                    seen[index] = true;
                }
                _ => return false,
            }
        }
        true
    }

    /// Flattens a mapping into a sequence: index mappings yield their values
    /// in index order, anything else in insertion order.
    pub(crate) fn into_ordered_sequence(map: Map) -> Vec<Node> {
        if Node::is_index_mapping(&map) {
            let mut slots: Vec<Option<Node>> = (0..map.len()).map(|_| None).collect();
            for (key, node) in map {
                let index = key.bytes().next().map_or(0, |b| (b - b'0') as usize);
                slots[index] = Some(node);
            }
            slots.into_iter().flatten().collect()
        } else {
            map.into_values().collect()
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Scalar(None) => write!(f, "Absent"),
            Node::Scalar(Some(s)) => write!(f, "Scalar({s})"),
            Node::Sequence(seq) => f.debug_list().entries(seq.iter()).finish(),
            Node::Mapping(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Some(s.to_owned()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Some(s))
    }
}

impl From<Vec<Node>> for Node {
    fn from(seq: Vec<Node>) -> Self {
        Node::Sequence(seq)
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Node::Mapping(map)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // an absent value round-trips through `unit`, which the
            // stringifier renders as a bare key under strict-null handling
            Node::Scalar(None) => serializer.serialize_unit(),
            Node::Scalar(Some(s)) => serializer.serialize_str(s),
            Node::Sequence(seq) => serializer.collect_seq(seq),
            Node::Mapping(map) => serializer.collect_map(map),
        }
    }
}
