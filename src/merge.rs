//! Resolution of repeated key paths.
//!
//! Whenever a path is written more than once, the newly built subtree is
//! welded onto the accumulator by [`merge`]. Ambiguous shapes are resolved
//! deterministically rather than rejected; the only failure the merge can
//! produce is the array limit under `throw_on_limit_exceeded`.

use indexmap::map::Entry;

use crate::error::{Error, Result};
use crate::options::Options;
use crate::value::{Map, Node};

/// Combines `source` into `target`. The resolution table, applied in order:
///
/// 1. no existing value: the new value is adopted as-is (handled by the
///    caller's vacant-entry path);
/// 2. mapping + mapping: deep merge, recursing per key;
/// 3. sequence + sequence: concatenate in encounter order;
/// 4. sequence + index mapping: overlay by index, extending the sequence to
///    fit; a non-index mapping appends as one element;
/// 5. sequence + scalar: append;
/// 6. mapping + sequence: flatten the mapping to a sequence first, then
///    concatenate;
/// 7. anything else: wrap both as a two-element sequence.
///
/// Array-likeness (rule 4) must be checked before the generic two-element
/// wrap so that index notation extends a sequence instead of nesting pairs.
pub(crate) fn merge(target: Node, source: Node, options: &Options) -> Result<Node> {
    match (target, source) {
        (Node::Mapping(mut target), Node::Mapping(source)) => {
            for (key, value) in source {
                match target.entry(key) {
                    Entry::Occupied(mut occupied) => {
                        let existing = std::mem::replace(occupied.get_mut(), Node::absent());
                        *occupied.get_mut() = merge(existing, value, options)?;
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(value);
                    }
                }
            }
            Ok(Node::Mapping(target))
        }
        (Node::Sequence(mut target), Node::Sequence(source)) => {
            for item in source {
                push_bounded(&mut target, item, options)?;
            }
            Ok(Node::Sequence(target))
        }
        (Node::Sequence(target), Node::Mapping(source)) => {
            if Node::is_index_mapping(&source) {
                overlay_indices(target, source, options)
            } else {
                let mut target = target;
                push_bounded(&mut target, Node::Mapping(source), options)?;
                Ok(Node::Sequence(target))
            }
        }
        (Node::Sequence(mut target), scalar @ Node::Scalar(_)) => {
            push_bounded(&mut target, scalar, options)?;
            Ok(Node::Sequence(target))
        }
        (Node::Mapping(target), Node::Sequence(source)) => {
            let mut seq = Node::into_ordered_sequence(target);
            for item in source {
                push_bounded(&mut seq, item, options)?;
            }
            Ok(Node::Sequence(seq))
        }
        (target, source) => {
            let mut seq = vec![target];
            push_bounded(&mut seq, source, options)?;
            Ok(Node::Sequence(seq))
        }
    }
}

/// Appends to a sequence, honoring the array limit: past it, either fail
/// fast or keep the first `array_limit` elements.
pub(crate) fn push_bounded(seq: &mut Vec<Node>, item: Node, options: &Options) -> Result<()> {
    if seq.len() >= options.array_limit {
        if options.throw_on_limit_exceeded {
            return Err(Error::limit("array", options.array_limit));
        }
        return Ok(());
    }
    seq.push(item);
    Ok(())
}

/// Rule 4: treat an index mapping as an index-addressed array and overlay it
/// onto the sequence, extending to fit the highest index.
fn overlay_indices(target: Vec<Node>, source: Map, options: &Options) -> Result<Node> {
    let mut slots: Vec<Option<Node>> = target.into_iter().map(Some).collect();
    for (key, value) in source {
        // keys were validated as single digits by `is_index_mapping`
        let index = key.bytes().next().map_or(0, |b| (b - b'0') as usize);
        if index >= options.array_limit {
            if options.throw_on_limit_exceeded {
                return Err(Error::limit("array", options.array_limit));
            }
            continue;
        }
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(match slots[index].take() {
            Some(existing) => merge(existing, value, options)?,
            None => value,
        });
    }
    // contiguity of the index keys means every slot is filled here
    Ok(Node::Sequence(slots.into_iter().flatten().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Options {
        Options::new()
    }

    fn mapping(entries: &[(&str, Node)]) -> Node {
        Node::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn deep_merges_mappings() {
        let target = mapping(&[("a", "1".into())]);
        let source = mapping(&[("b", "2".into())]);
        assert_eq!(
            merge(target, source, &opts()).unwrap(),
            mapping(&[("a", "1".into()), ("b", "2".into())])
        );
    }

    #[test]
    fn concatenates_sequences() {
        let target = Node::Sequence(vec!["a".into()]);
        let source = Node::Sequence(vec!["b".into(), "c".into()]);
        assert_eq!(
            merge(target, source, &opts()).unwrap(),
            Node::Sequence(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn overlays_index_mapping_onto_sequence() {
        let target = Node::Sequence(vec!["a".into()]);
        let source = mapping(&[("1", "b".into()), ("0", "z".into())]);
        // index 0 collides with the existing element and combines
        assert_eq!(
            merge(target, source, &opts()).unwrap(),
            Node::Sequence(vec![
                Node::Sequence(vec!["a".into(), "z".into()]),
                "b".into()
            ])
        );
    }

    #[test]
    fn appends_non_index_mapping_as_one_element() {
        let target = Node::Sequence(vec!["a".into()]);
        let source = mapping(&[("x", "1".into())]);
        assert_eq!(
            merge(target, source.clone(), &opts()).unwrap(),
            Node::Sequence(vec!["a".into(), source])
        );
    }

    #[test]
    fn wraps_scalars_as_pair() {
        assert_eq!(
            merge("a".into(), "b".into(), &opts()).unwrap(),
            Node::Sequence(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn mapping_then_sequence_flattens() {
        let target = mapping(&[("0", "a".into()), ("1", "b".into())]);
        let source = Node::Sequence(vec!["c".into()]);
        assert_eq!(
            merge(target, source, &opts()).unwrap(),
            Node::Sequence(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn array_limit_truncates_or_throws() {
        let options = Options::new().array_limit(2);
        let target = Node::Sequence(vec!["a".into(), "b".into()]);
        let source = Node::Sequence(vec!["c".into()]);
        assert_eq!(
            merge(target.clone(), source.clone(), &options).unwrap(),
            target
        );

        let throwing = options.throw_on_limit_exceeded(true);
        assert!(matches!(
            merge(target, source, &throwing),
            Err(Error::LimitExceeded { kind: "array", .. })
        ));
    }

}
