//! Property tests for the key and row encodings.

use proptest::prelude::*;

use crate::encoding::keys::{id_key, pair_key};
use crate::encoding::{Decoder, Encoder};
use crate::types::{NetworkConfig, NetworkInfo, NetworkKind};

proptest! {
    // Byte order of id keys must agree with numeric order, or range scans
    // would return elements out of sequence.
    #[test]
    fn id_keys_preserve_order(a in any::<u64>(), b in any::<u64>()) {
        prop_assert_eq!(a.cmp(&b), id_key(a).cmp(&id_key(b)));
    }

    // Adjacency keys must sort by node first, link second.
    #[test]
    fn pair_keys_sort_by_node_then_link(
        (n1, l1, n2, l2) in (any::<u64>(), any::<u64>(), any::<u64>(), any::<u64>()),
    ) {
        let expected = (n1, l1).cmp(&(n2, l2));
        prop_assert_eq!(expected, pair_key(n1, l1).cmp(&pair_key(n2, l2)));
    }

    #[test]
    fn registry_rows_round_trip(
        name in "[a-z][a-z0-9_]{0,24}",
        spatial in any::<bool>(),
        srid in -1i32..100_000,
        has_z in any::<bool>(),
        allow_coincident in any::<bool>(),
        next_node_id in 1u64..u64::MAX,
        next_link_id in 1u64..u64::MAX,
    ) {
        let kind = if spatial { NetworkKind::Spatial } else { NetworkKind::Logical };
        let mut info =
            NetworkInfo::new(NetworkConfig::new(name, kind, srid, has_z, allow_coincident));
        info.next_node_id = next_node_id;
        info.next_link_id = next_link_id;
        let decoded = NetworkInfo::decode(&info.encode().expect("encode")).expect("decode");
        prop_assert_eq!(decoded, info);
    }
}
