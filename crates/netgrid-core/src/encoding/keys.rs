//! Key layouts for ordered storage.
//!
//! All numeric key components are big-endian so byte order matches numeric
//! order, which lets the stores run range scans over ids and id pairs
//! without decoding values.
//!
//! Layouts:
//!
//! - Element tables: `[id: u64]`
//! - Adjacency indexes: `[node_id: u64][link_id: u64]`
//! - Registry / catalog rows: the name's UTF-8 bytes

/// Encode an element id as a table key.
#[inline]
#[must_use]
pub fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

/// Decode an element-id key.
#[inline]
#[must_use]
pub fn decode_id_key(key: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = key.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}

/// Encode an adjacency-index key: `[node_id][link_id]`.
#[must_use]
pub fn pair_key(node_id: u64, link_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&node_id.to_be_bytes());
    key[8..].copy_from_slice(&link_id.to_be_bytes());
    key
}

/// Decode an adjacency-index key into `(node_id, link_id)`.
#[must_use]
pub fn decode_pair_key(key: &[u8]) -> Option<(u64, u64)> {
    if key.len() != 16 {
        return None;
    }
    let node: [u8; 8] = key[..8].try_into().ok()?;
    let link: [u8; 8] = key[8..].try_into().ok()?;
    Some((u64::from_be_bytes(node), u64::from_be_bytes(link)))
}

/// Range bounds covering every adjacency key for one node.
///
/// Returns `(start_inclusive, end_exclusive)`; the end is `None` when the
/// node id is `u64::MAX` and the range is unbounded above.
#[must_use]
pub fn pair_prefix_range(node_id: u64) -> ([u8; 8], Option<[u8; 8]>) {
    (node_id.to_be_bytes(), node_id.checked_add(1).map(u64::to_be_bytes))
}

/// Encode a name as a registry/catalog key.
#[inline]
#[must_use]
pub fn name_key(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_key_round_trip() {
        assert_eq!(decode_id_key(&id_key(42)), Some(42));
        assert_eq!(decode_id_key(&[1, 2, 3]), None);
    }

    #[test]
    fn pair_key_round_trip() {
        assert_eq!(decode_pair_key(&pair_key(7, 9)), Some((7, 9)));
        assert_eq!(decode_pair_key(&[0u8; 8]), None);
    }

    #[test]
    fn pair_keys_group_by_node() {
        let (start, end) = pair_prefix_range(7);
        let end = end.expect("bounded");
        let inside = pair_key(7, u64::MAX);
        let outside = pair_key(8, 0);
        assert!(inside.as_slice() >= start.as_slice());
        assert!(inside[..8] < end[..]);
        assert!(outside[..8] >= end[..]);
    }

    #[test]
    fn max_node_prefix_is_unbounded() {
        let (_, end) = pair_prefix_range(u64::MAX);
        assert!(end.is_none());
    }
}
