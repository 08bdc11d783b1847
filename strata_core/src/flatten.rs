//! # Flattening
//!
//! Nested values become dotted keys:
//! - map entries join with `.` (`db.host`)
//! - list items are bracket-indexed (`hosts[0]`) and every list also records
//!   `<path>.length`
//!
//! `unflatten` rebuilds a nested tree from such keys for typed decoding.

use crate::types::{Snapshot, Value};
use errors::ConfigError;
use std::collections::{BTreeMap, HashSet};

pub fn flatten(value: &Value, path: &str, output: &mut Snapshot) {
    match value {
        Value::Map(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten(child, &child_path, output);
            }
        }
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(item, &format!("{path}[{index}]"), output);
            }
            output.insert(format!("{path}.length"), Value::from(items.len()));
        }
        scalar => {
            output.insert(path.to_string(), scalar.clone());
        }
    }
}

/// Flatten a whole document. The root has to be a map.
pub fn flatten_root(value: &Value, resource: &str) -> errors::Result<Snapshot> {
    if !matches!(value, Value::Map(_)) {
        return Err(ConfigError::parse(
            resource,
            format!("expected an object at the top level, found {}", value.kind())
        ));
    }
    let mut output = Snapshot::new();
    flatten(value, "", &mut output);
    Ok(output)
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize)
}

fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let Some(open) = part.find('[') else {
            segments.push(Segment::Key(part.to_string()));
            continue;
        };
        let mut indices = Vec::new();
        let mut rest = &part[open..];
        while let Some(inner) = rest.strip_prefix('[') {
            let Some(close) = inner.find(']') else {
                break;
            };
            let Ok(index) = inner[..close].parse::<usize>() else {
                break;
            };
            indices.push(Segment::Index(index));
            rest = &inner[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Key(part.to_string()));
            continue;
        }
        if open > 0 {
            segments.push(Segment::Key(part[..open].to_string()));
        }
        segments.extend(indices);
    }
    segments
}

/// Every prefix of `key` that directly precedes a `[n]` index.
fn list_bases(key: &str) -> impl Iterator<Item = &str> {
    key.match_indices('[').map(move |(i, _)| &key[..i])
}

/// Missing slots tolerated in a rebuilt list before its highest index is
/// rejected.
const MAX_LIST_GAP: usize = 1024;

#[derive(Debug)]
enum Node {
    Leaf(Value),
    Branch(BTreeMap<String, Node>),
    Seq(BTreeMap<usize, Node>)
}

impl Node {
    fn child(&mut self, segment: &Segment) -> &mut Node {
        match segment {
            Segment::Key(key) => {
                if !matches!(self, Node::Branch(_)) {
                    *self = Node::Branch(BTreeMap::new());
                }
                let Node::Branch(map) = self else {
                    unreachable!("node was just made a branch");
                };
                map.entry(key.clone())
                    .or_insert_with(|| Node::Leaf(Value::Nil))
            }
            Segment::Index(index) => {
                if !matches!(self, Node::Seq(_)) {
                    *self = Node::Seq(BTreeMap::new());
                }
                let Node::Seq(items) = self else {
                    unreachable!("node was just made a sequence");
                };
                items.entry(*index).or_insert_with(|| Node::Leaf(Value::Nil))
            }
        }
    }

    fn into_value(self) -> errors::Result<Value> {
        match self {
            Node::Leaf(value) => Ok(value),
            Node::Branch(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, v.into_value()?)))
                .collect::<errors::Result<BTreeMap<String, Value>>>()
                .map(Value::Map),
            Node::Seq(items) => {
                let Some(&last) = items.keys().next_back() else {
                    return Ok(Value::List(Vec::new()));
                };
                let limit = items.len().saturating_add(MAX_LIST_GAP);
                let len = match last.checked_add(1) {
                    Some(len) if len <= limit => len,
                    _ => {
                        return Err(ConfigError::decode(format!(
                            "list index {last} is out of range for {} item(s)",
                            items.len()
                        )));
                    }
                };
                let mut list = vec![Value::Nil; len];
                for (index, node) in items {
                    list[index] = node.into_value()?;
                }
                Ok(Value::List(list))
            }
        }
    }
}

/// Rebuild a nested map from flat keys. Keys are lowercased. When a key is
/// both a scalar and a parent of deeper keys, the deeper structure wins.
/// A list index far beyond the entries present is a `Decode` error.
pub fn unflatten(snapshot: &Snapshot) -> errors::Result<Value> {
    let lowered: Snapshot = snapshot
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();
    let bases: HashSet<&str> = lowered.keys().flat_map(|k| list_bases(k)).collect();

    let mut root = Node::Branch(BTreeMap::new());
    for (key, value) in &lowered {
        if let Some(base) = key.strip_suffix(".length") {
            if bases.contains(base) {
                continue;
            }
            if crate::cast::to_i64(value) == Some(0) {
                insert(&mut root, &parse_path(base), Value::List(Vec::new()));
                continue;
            }
        }
        insert(&mut root, &parse_path(key), value.clone());
    }
    root.into_value()
}

/// The nested value rooted at `key`, rebuilt from the entries below it
/// (`key.*` and `key[n]*`). `None` when nothing is nested below `key`.
pub fn subtree(snapshot: &Snapshot, key: &str) -> errors::Result<Option<Value>> {
    let base = key.to_lowercase();
    let below: Snapshot = snapshot
        .iter()
        .filter(|(k, _)| {
            let lowered = k.to_lowercase();
            lowered
                .strip_prefix(base.as_str())
                .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if below.is_empty() {
        return Ok(None);
    }

    let mut node = unflatten(&below)?;
    for segment in parse_path(&base) {
        let next = match (segment, node) {
            (Segment::Key(k), Value::Map(mut map)) => map.remove(&k),
            (Segment::Index(i), Value::List(mut items)) if i < items.len() => {
                Some(items.swap_remove(i))
            }
            _ => None
        };
        match next {
            Some(value) => node = value,
            None => return Ok(None)
        }
    }
    Ok(Some(node))
}

fn insert(root: &mut Node, segments: &[Segment], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = root;
    for segment in parents {
        node = node.child(segment);
    }
    let slot = node.child(last);
    if matches!(slot, Node::Leaf(_)) {
        *slot = Node::Leaf(value);
    } else {
        tracing::debug!(?segments, "Scalar shadowed by nested keys, keeping nested value");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Value {
        Value::from_json_slice(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_flatten_nested_map() {
        let flat = flatten_root(&doc(r#"{"db": {"host": "h", "port": 5432}}"#), "t").unwrap();
        assert_eq!(flat["db.host"], Value::from("h"));
        assert_eq!(flat["db.port"], Value::from(5432));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_flatten_list_records_length() {
        let mut flat = Snapshot::new();
        flatten(&Value::from(vec!["x", "y"]), "a", &mut flat);
        assert_eq!(flat["a[0]"], Value::from("x"));
        assert_eq!(flat["a[1]"], Value::from("y"));
        assert_eq!(flat["a.length"], Value::from(2));
    }

    #[test]
    fn test_flatten_list_of_maps() {
        let flat =
            flatten_root(&doc(r#"{"servers": [{"name": "a"}, {"name": "b"}]}"#), "t").unwrap();
        assert_eq!(flat["servers[0].name"], Value::from("a"));
        assert_eq!(flat["servers[1].name"], Value::from("b"));
        assert_eq!(flat["servers.length"], Value::from(2));
    }

    #[test]
    fn test_flatten_empty_list_only_length() {
        let mut flat = Snapshot::new();
        flatten(&Value::List(Vec::new()), "empty", &mut flat);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["empty.length"], Value::from(0));
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let value = doc(r#"{"b": [1, {"c": true}], "a": {"z": 1, "y": 2}}"#);
        assert_eq!(flatten_root(&value, "t").unwrap(), flatten_root(&value, "t").unwrap());
    }

    #[test]
    fn test_flatten_root_rejects_non_object() {
        let err = flatten_root(&doc("[1, 2]"), "list.json").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_path_segments() {
        assert_eq!(
            parse_path("a.b[0][2].c"),
            vec![
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Index(0),
                Segment::Index(2),
                Segment::Key("c".into())
            ]
        );
        assert_eq!(parse_path("odd[x]"), vec![Segment::Key("odd[x]".into())]);
    }

    #[test]
    fn test_unflatten_restores_structure() {
        let original = doc(r#"{"db": {"hosts": ["a", "b"], "port": 1}, "tags": []}"#);
        let flat = flatten_root(&original, "t").unwrap();
        assert_eq!(unflatten(&flat).unwrap(), original);
    }

    #[test]
    fn test_unflatten_lowercases_keys() {
        let mut flat = Snapshot::new();
        flat.insert("Server.Host".into(), Value::from("h"));
        let Value::Map(root) = unflatten(&flat).unwrap() else {
            panic!("expected map");
        };
        let Value::Map(server) = &root["server"] else {
            panic!("expected nested map");
        };
        assert_eq!(server["host"], Value::from("h"));
    }

    #[test]
    fn test_unflatten_nested_wins_over_scalar() {
        let mut flat = Snapshot::new();
        flat.insert("a".into(), Value::from(1));
        flat.insert("a.b".into(), Value::from(2));
        let Value::Map(root) = unflatten(&flat).unwrap() else {
            panic!("expected map");
        };
        assert!(matches!(root["a"], Value::Map(_)));
    }

    #[test]
    fn test_unflatten_sparse_list_fills_nil() {
        let mut flat = Snapshot::new();
        flat.insert("a[2]".into(), Value::from("c"));
        let Value::Map(root) = unflatten(&flat).unwrap() else {
            panic!("expected map");
        };
        assert_eq!(root["a"], Value::List(vec![Value::Nil, Value::Nil, Value::from("c")]));
    }

    #[test]
    fn test_unflatten_rejects_huge_index() {
        let mut flat = Snapshot::new();
        flat.insert(format!("x[{}]", usize::MAX), Value::from("boom"));
        assert!(unflatten(&flat).unwrap_err().is_decode());

        let mut flat = Snapshot::new();
        flat.insert("x[1000000000000]".into(), Value::from("boom"));
        assert!(unflatten(&flat).unwrap_err().is_decode());
    }

    #[test]
    fn test_subtree_of_list_and_map() {
        let flat = flatten_root(
            &doc(r#"{"tags": ["a", "b"], "db": {"host": "h", "replicas": [{"port": 1}]}}"#),
            "t"
        )
        .unwrap();
        assert_eq!(subtree(&flat, "tags").unwrap(), Some(doc(r#"["a", "b"]"#)));
        assert_eq!(
            subtree(&flat, "DB").unwrap(),
            Some(doc(r#"{"host": "h", "replicas": [{"port": 1}]}"#))
        );
        assert_eq!(subtree(&flat, "db.replicas[0]").unwrap(), Some(doc(r#"{"port": 1}"#)));
        assert_eq!(subtree(&flat, "db.host").unwrap(), None);
        assert_eq!(subtree(&flat, "ta").unwrap(), None);
    }
}
