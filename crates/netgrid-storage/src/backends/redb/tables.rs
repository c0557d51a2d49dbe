//! Physical key layout for the shared data table.
//!
//! A logical key `(table, key)` is stored as `table-bytes ++ 0x00 ++ key`.
//! Table names must not contain NUL, so the separator keeps logical tables
//! in disjoint, contiguous physical ranges: everything belonging to one
//! table sorts between `table ++ 0x00` and `table ++ 0x01`.

use redb::TableDefinition;

/// The single physical table holding all logical tables.
pub(crate) const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("netgrid_data");

/// Encode a logical `(table, key)` pair as a physical key.
pub(crate) fn encode_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(table.len() + 1 + key.len());
    out.extend_from_slice(table.as_bytes());
    out.push(0x00);
    out.extend_from_slice(key);
    out
}

/// The smallest physical key belonging to a logical table.
pub(crate) fn table_start_key(table: &str) -> Vec<u8> {
    encode_key(table, &[])
}

/// The smallest physical key past a logical table's range.
pub(crate) fn table_end_key(table: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(table.len() + 1);
    out.extend_from_slice(table.as_bytes());
    out.push(0x01);
    out
}

/// Strip the table prefix from a physical key.
pub(crate) fn strip_prefix(table: &str, physical: &[u8]) -> Vec<u8> {
    physical[table.len() + 1..].to_vec()
}
