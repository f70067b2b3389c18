//! Writer for `bplist00` documents, used to produce keyed-archive payloads.

use crate::plist::BPLIST_MAGIC;

/// Owned property list tree accepted by [`write_binary_plist`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Data(Vec<u8>),
    Uid(u64),
    Array(Vec<PlistValue>),
    Dict(Vec<(String, PlistValue)>),
}

enum Node {
    Leaf(Vec<u8>),
    Array(Vec<usize>),
    Dict(Vec<usize>, Vec<usize>),
}

/// Serializes `root` as a binary property list. The root is object 0;
/// objects are not deduplicated.
pub fn write_binary_plist(root: &PlistValue) -> Vec<u8> {
    let mut nodes = Vec::new();
    flatten(root, &mut nodes);

    let ref_size = min_width(nodes.len() as u64 - 1);
    let mut out = BPLIST_MAGIC.to_vec();
    let mut offsets = Vec::with_capacity(nodes.len());

    for node in &nodes {
        offsets.push(out.len() as u64);
        match node {
            Node::Leaf(bytes) => out.extend_from_slice(bytes),
            Node::Array(items) => {
                push_header(&mut out, 0xA, items.len());
                for &item in items {
                    push_sized(&mut out, item as u64, ref_size);
                }
            }
            Node::Dict(keys, values) => {
                push_header(&mut out, 0xD, keys.len());
                for &item in keys.iter().chain(values) {
                    push_sized(&mut out, item as u64, ref_size);
                }
            }
        }
    }

    let table_start = out.len() as u64;
    let offset_size = min_width(offsets.iter().copied().max().unwrap_or(0));
    for offset in offsets {
        push_sized(&mut out, offset, offset_size);
    }

    out.extend_from_slice(&[0u8; 6]);
    out.push(offset_size as u8);
    out.push(ref_size as u8);
    out.extend_from_slice(&(nodes.len() as u64).to_be_bytes());
    out.extend_from_slice(&0u64.to_be_bytes());
    out.extend_from_slice(&table_start.to_be_bytes());
    out
}

// Depth-first; a container reserves its slot before its children so the
// root always lands at index 0.
fn flatten(value: &PlistValue, nodes: &mut Vec<Node>) -> usize {
    let index = nodes.len();
    match value {
        PlistValue::Array(items) => {
            nodes.push(Node::Array(Vec::new()));
            let refs = items.iter().map(|item| flatten(item, nodes)).collect();
            nodes[index] = Node::Array(refs);
        }
        PlistValue::Dict(entries) => {
            nodes.push(Node::Dict(Vec::new(), Vec::new()));
            let keys = entries
                .iter()
                .map(|(key, _)| push_leaf(nodes, encode_string(key)))
                .collect();
            let values = entries
                .iter()
                .map(|(_, value)| flatten(value, nodes))
                .collect();
            nodes[index] = Node::Dict(keys, values);
        }
        leaf => {
            nodes.push(Node::Leaf(encode_leaf(leaf)));
        }
    }
    index
}

fn push_leaf(nodes: &mut Vec<Node>, bytes: Vec<u8>) -> usize {
    nodes.push(Node::Leaf(bytes));
    nodes.len() - 1
}

fn encode_leaf(value: &PlistValue) -> Vec<u8> {
    let mut out = Vec::new();
    match value {
        PlistValue::Null => out.push(0x00),
        PlistValue::Bool(false) => out.push(0x08),
        PlistValue::Bool(true) => out.push(0x09),
        PlistValue::Integer(value) => push_integer(&mut out, *value),
        PlistValue::Real(value) => {
            out.push(0x23);
            out.extend_from_slice(&value.to_bits().to_be_bytes());
        }
        PlistValue::String(text) => return encode_string(text),
        PlistValue::Data(bytes) => {
            push_header(&mut out, 0x4, bytes.len());
            out.extend_from_slice(bytes);
        }
        PlistValue::Uid(value) => {
            let width = min_width(*value);
            out.push(0x80 | (width as u8 - 1));
            push_sized(&mut out, *value, width);
        }
        PlistValue::Array(_) | PlistValue::Dict(_) => {}
    }
    out
}

fn encode_string(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    if text.is_ascii() {
        push_header(&mut out, 0x5, text.len());
        out.extend_from_slice(text.as_bytes());
    } else {
        let units: Vec<u16> = text.encode_utf16().collect();
        push_header(&mut out, 0x6, units.len());
        for unit in units {
            out.extend_from_slice(&unit.to_be_bytes());
        }
    }
    out
}

fn push_header(out: &mut Vec<u8>, kind: u8, count: usize) {
    if count < 0x0F {
        out.push((kind << 4) | count as u8);
    } else {
        out.push((kind << 4) | 0x0F);
        push_integer(out, count as i64);
    }
}

fn push_integer(out: &mut Vec<u8>, value: i64) {
    let width = if value < 0 { 8 } else { min_width(value as u64) };
    out.push(0x10 | width.trailing_zeros() as u8);
    push_sized(out, value as u64, width);
}

fn push_sized(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

fn min_width(value: u64) -> usize {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFFFF_FFFF => 4,
        _ => 8,
    }
}

#[cfg(test)]
mod tests {
    use super::{write_binary_plist, PlistValue};
    use crate::plist::{BinaryPlist, PlistObject};

    #[test]
    fn long_strings_use_extended_count() {
        let text = "x".repeat(40);
        let data = write_binary_plist(&PlistValue::String(text.clone()));
        let plist = BinaryPlist::parse(&data).unwrap();
        assert_eq!(plist.object(0).unwrap(), PlistObject::String(text));
    }

    #[test]
    fn integers_keep_their_value() {
        let root = PlistValue::Array(vec![
            PlistValue::Integer(7),
            PlistValue::Integer(70_000),
            PlistValue::Integer(-3),
        ]);
        let data = write_binary_plist(&root);
        let plist = BinaryPlist::parse(&data).unwrap();
        let PlistObject::Array(items) = plist.object(0).unwrap() else {
            panic!("expected array");
        };
        let values: Vec<_> = items
            .into_iter()
            .map(|index| plist.object(index).unwrap())
            .collect();
        assert_eq!(
            values,
            vec![
                PlistObject::Integer(7),
                PlistObject::Integer(70_000),
                PlistObject::Integer(-3),
            ]
        );
    }

    #[test]
    fn many_objects_widen_references() {
        let items = (0..300).map(PlistValue::Integer).collect();
        let data = write_binary_plist(&PlistValue::Array(items));
        let plist = BinaryPlist::parse(&data).unwrap();
        assert_eq!(plist.len(), 301);
        let PlistObject::Array(items) = plist.object(0).unwrap() else {
            panic!("expected array");
        };
        assert_eq!(plist.object(items[299]).unwrap(), PlistObject::Integer(299));
    }
}
