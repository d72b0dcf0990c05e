//! Querystring parsing: segmenting, path parsing and tree building.
//!
//! Parsing proceeds in stages. The segmenter splits the input into raw
//! `key=value` pairs and enforces the parameter limit before any tree is
//! built. Repeated raw keys are then resolved per the duplicates policy.
//! Each surviving pair has its key parsed into a path of segments, the path
//! is folded at the depth limit, and a single-branch subtree is built from
//! the leaf outwards and merged into the accumulator.

mod decode;

use std::borrow::Cow;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::merge::{merge, push_bounded};
use crate::options::{Duplicates, Options};
use crate::value::{Map, Node};

/// Parses a querystring into a map of [`Node`] trees.
pub(crate) fn parse(input: &str, options: &Options) -> Result<Map> {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut root = Map::default();
    if input.is_empty() {
        return Ok(root);
    }

    let pairs = segment(input, options)?;
    let flat = resolve_duplicates(pairs, options)?;

    for (raw_key, leaf) in flat {
        // depth 0 turns bracket parsing off entirely, keeping the raw key
        // as one literal segment
        let path = if options.depth == 0 {
            vec![decode_segment(raw_key, options)?]
        } else {
            let mut path = parse_path(raw_key, options)?;
            fold_depth(&mut path, options);
            path
        };
        if !options.allow_prototypes && path.iter().any(|s| is_prototype_key(s)) {
            continue;
        }
        insert_branch(&mut root, path, leaf, options)?;
    }

    if !options.allow_sparse {
        for node in root.values_mut() {
            compact(node);
        }
    }
    Ok(root)
}

/// Splits the input into raw pairs and enforces the parameter limit before
/// any per-pair work happens.
fn segment<'a>(input: &'a str, options: &Options) -> Result<Vec<(&'a str, Option<&'a str>)>> {
    let mut pairs: Vec<_> = input
        .split(options.delimiter)
        .filter(|part| !part.is_empty())
        .map(split_pair)
        .collect();

    if pairs.len() > options.parameter_limit {
        if options.throw_on_limit_exceeded {
            return Err(Error::limit("parameter", options.parameter_limit));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            limit = options.parameter_limit,
            dropped = pairs.len() - options.parameter_limit,
            "dropping parameters over the configured limit"
        );
        pairs.truncate(options.parameter_limit);
    }
    Ok(pairs)
}

/// Splits one part at its key/value separator. The scan tracks bracket
/// depth so an `=` inside `[...]` never splits the pair. A part with no
/// top-level `=` is a bare key.
fn split_pair(part: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, b) in part.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 => return (&part[..i], Some(&part[i + 1..])),
            _ => {}
        }
    }
    // unterminated bracket: fall back to the first `=`
    match part.split_once('=') {
        Some((key, value)) if depth > 0 => (key, Some(value)),
        _ => (part, None),
    }
}

/// Decodes each pair's value into a leaf and resolves repeated raw keys per
/// the duplicates policy. Insertion order of first appearance is kept.
fn resolve_duplicates<'a>(
    pairs: Vec<(&'a str, Option<&'a str>)>,
    options: &Options,
) -> Result<IndexMap<&'a str, Node>> {
    let mut flat: IndexMap<&str, Node> = IndexMap::with_capacity(pairs.len());
    for (raw_key, raw_value) in pairs {
        let leaf = decode_leaf(raw_key, raw_value, options)?;
        match flat.entry(raw_key) {
            Entry::Occupied(mut occupied) => match options.duplicates {
                Duplicates::Combine => {
                    let existing = std::mem::replace(occupied.get_mut(), Node::absent());
                    *occupied.get_mut() = merge(existing, leaf, options)?;
                }
                Duplicates::First => {}
                Duplicates::Last => {
                    *occupied.get_mut() = leaf;
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(leaf);
            }
        }
    }
    Ok(flat)
}

/// Decodes a raw value into a leaf node. A key with no `=` yields an absent
/// value under strict-null handling and an empty string otherwise. With the
/// comma option, a value containing commas becomes a sequence.
fn decode_leaf(raw_key: &str, raw_value: Option<&str>, options: &Options) -> Result<Node> {
    let Some(raw_value) = raw_value else {
        return Ok(if options.strict_null_handling {
            Node::absent()
        } else {
            Node::Scalar(Some(String::new()))
        });
    };

    let decoded =
        decode::decode_scalar(raw_value, options).map_err(|msg| Error::decode(raw_key, msg))?;

    if options.comma && decoded.contains(',') {
        let mut seq = Vec::new();
        for part in decoded.split(',') {
            push_bounded(&mut seq, Node::Scalar(Some(part.to_owned())), options)?;
        }
        return Ok(Node::Sequence(seq));
    }
    Ok(Node::Scalar(Some(decoded)))
}

/// Parses one raw key into its ordered path of decoded segments.
///
/// The parent segment is everything before the first `[`; each following
/// `[...]` span is one segment. A malformed remainder (unterminated bracket
/// or stray text between groups) is kept verbatim as one final literal
/// segment rather than dropped.
fn parse_path(raw_key: &str, options: &Options) -> Result<Vec<String>> {
    let key: Cow<'_, str> = if options.allow_dots {
        rewrite_dots(raw_key)
    } else {
        Cow::Borrowed(raw_key)
    };
    let key = key.as_ref();

    let parent_end = key.find('[').unwrap_or(key.len());
    let mut segments = vec![decode_segment(&key[..parent_end], options)?];

    let mut rest = &key[parent_end..];
    while !rest.is_empty() {
        if let Some(open) = rest.strip_prefix('[') {
            if let Some(close) = open.find(']') {
                let tail = &open[close + 1..];
                if tail.is_empty() || tail.starts_with('[') {
                    segments.push(decode_segment(&open[..close], options)?);
                    rest = tail;
                    continue;
                }
            }
        }
        segments.push(decode_segment(rest, options)?);
        break;
    }
    Ok(segments)
}

fn decode_segment(segment: &str, options: &Options) -> Result<String> {
    decode::decode_scalar(segment, options).map_err(|msg| Error::decode(segment, msg))
}

/// Rewrites dots outside bracket groups into bracket groups, so `a.b.c`
/// parses like `a[b][c]`.
fn rewrite_dots(key: &str) -> Cow<'_, str> {
    if !key.contains('.') {
        return Cow::Borrowed(key);
    }
    let mut out = String::with_capacity(key.len() + 4);
    let mut depth = 0usize;
    let mut open_group = false;
    for c in key.chars() {
        match c {
            '[' => {
                if open_group {
                    out.push(']');
                    open_group = false;
                }
                depth += 1;
                out.push('[');
            }
            ']' => {
                depth = depth.saturating_sub(1);
                out.push(']');
            }
            '.' if depth == 0 => {
                if open_group {
                    out.push(']');
                }
                out.push('[');
                open_group = true;
            }
            other => out.push(other),
        }
    }
    if open_group {
        out.push(']');
    }
    Cow::Owned(out)
}

fn is_prototype_key(segment: &str) -> bool {
    matches!(segment, "__proto__" | "constructor" | "prototype")
}

/// Folds segments beyond the depth limit into one literal bracket-suffix
/// segment, so nothing is lost past the limit.
fn fold_depth(path: &mut Vec<String>, options: &Options) {
    if path.len() <= options.depth + 1 {
        return;
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(
        depth = options.depth,
        folded = path.len() - options.depth - 1,
        "folding key segments past the depth limit"
    );
    let tail: String = path
        .split_off(options.depth + 1)
        .into_iter()
        .map(|segment| format!("[{segment}]"))
        .collect();
    path.push(tail);
}

/// Builds the single-branch subtree for one (path, leaf) pair from the
/// inside out and merges it into the accumulator at the root key.
fn insert_branch(root: &mut Map, path: Vec<String>, leaf: Node, options: &Options) -> Result<()> {
    let mut segments = path.into_iter();
    let Some(root_key) = segments.next() else {
        return Ok(());
    };
    let rest: Vec<String> = segments.collect();
    let last = rest.len().checked_sub(1);

    let mut node = leaf;
    for (i, segment) in rest.into_iter().enumerate().rev() {
        node = if segment.is_empty() {
            if Some(i) == last && options.allow_empty_arrays && node.is_empty_value() {
                Node::Sequence(Vec::new())
            } else if Some(i) == last && matches!(node, Node::Sequence(_)) {
                // a leaf that is already a sequence (combined duplicates or
                // a comma-split value) appends element-wise instead of
                // nesting another level
                node
            } else {
                Node::Sequence(vec![node])
            }
        } else {
            let mut map = Map::with_capacity(1);
            map.insert(segment, node);
            Node::Mapping(map)
        };
    }

    match root.entry(root_key) {
        Entry::Occupied(mut occupied) => {
            let existing = std::mem::replace(occupied.get_mut(), Node::absent());
            *occupied.get_mut() = merge(existing, node, options)?;
        }
        Entry::Vacant(vacant) => {
            vacant.insert(node);
        }
    }
    Ok(())
}

/// Drops absent elements from sequences, recursively. Skipped when sparse
/// sequences are admitted.
fn compact(node: &mut Node) {
    match node {
        Node::Scalar(_) => {}
        Node::Sequence(seq) => {
            seq.retain(|item| !matches!(item, Node::Scalar(None)));
            for item in seq {
                compact(item);
            }
        }
        Node::Mapping(map) => {
            for value in map.values_mut() {
                compact(value);
            }
        }
    }
}
