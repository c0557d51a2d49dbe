//! Validity checking for logical and spatial networks.
//!
//! Both checks scan the element tables and collect every discrepancy into
//! a [`ValidityReport`]; discrepancies are data, not errors, so a scan
//! only fails on storage trouble. An empty report means a valid network.

use geo::Intersects;
use netgrid_core::Point;
use netgrid_storage::Transaction;
use serde::{Deserialize, Serialize};

use crate::error::TopoResult;
use crate::schema::NetTables;
use crate::store::{NetLinkStore, NetNodeStore};

/// The kinds of discrepancy a validity scan can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscrepancyKind {
    /// A logical network's node carries geometry.
    NodeHasGeometry,
    /// A logical network's link carries geometry.
    LinkHasGeometry,
    /// A spatial network's node is missing its geometry.
    MissingNodeGeometry,
    /// A spatial network's link is missing its geometry.
    MissingLinkGeometry,
    /// A link's first vertex does not touch its start node's point.
    GeometryStartMismatch,
    /// A link's last vertex does not touch its end node's point.
    GeometryEndMismatch,
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NodeHasGeometry => "node has geometry",
            Self::LinkHasGeometry => "link has geometry",
            Self::MissingNodeGeometry => "missing node geometry",
            Self::MissingLinkGeometry => "missing link geometry",
            Self::GeometryStartMismatch => "geometry start mismatch",
            Self::GeometryEndMismatch => "geometry end mismatch",
        };
        f.write_str(text)
    }
}

/// One row of a validity report.
///
/// `primitive1` is the offending element's id; for endpoint mismatches
/// `primitive2` carries the referenced node's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// What was found.
    pub kind: DiscrepancyKind,
    /// The offending element.
    pub primitive1: u64,
    /// The other element involved, if any.
    pub primitive2: Option<u64>,
}

/// The outcome of a validity scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityReport {
    entries: Vec<Discrepancy>,
}

impl ValidityReport {
    /// Whether the scan found no discrepancies.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    /// The collected discrepancies, in scan order.
    #[must_use]
    pub fn entries(&self) -> &[Discrepancy] {
        &self.entries
    }

    fn push(&mut self, kind: DiscrepancyKind, primitive1: u64, primitive2: Option<u64>) {
        self.entries.push(Discrepancy { kind, primitive1, primitive2 });
    }
}

/// Scan a logical network for geometry that should not be there.
///
/// # Errors
///
/// Returns an error only on storage failure; discrepancies are collected,
/// not raised.
pub fn check_logical<T: Transaction>(tx: &T, tables: &NetTables) -> TopoResult<ValidityReport> {
    let mut report = ValidityReport::default();
    for node in NetNodeStore::all(tx, tables)? {
        if node.geom.is_some() {
            report.push(DiscrepancyKind::NodeHasGeometry, node.id.as_u64(), None);
        }
    }
    for link in NetLinkStore::all(tx, tables)? {
        if link.geom.is_some() {
            report.push(DiscrepancyKind::LinkHasGeometry, link.id.as_u64(), None);
        }
    }
    Ok(report)
}

/// Scan a spatial network for missing geometry and for link endpoints
/// that do not touch their nodes' points.
///
/// # Errors
///
/// Returns an error only on storage failure; discrepancies are collected,
/// not raised.
pub fn check_spatial<T: Transaction>(tx: &T, tables: &NetTables) -> TopoResult<ValidityReport> {
    let mut report = ValidityReport::default();

    for node in NetNodeStore::all(tx, tables)? {
        if node.geom.is_none() {
            report.push(DiscrepancyKind::MissingNodeGeometry, node.id.as_u64(), None);
        }
    }

    for link in NetLinkStore::all(tx, tables)? {
        let Some(line) = &link.geom else {
            report.push(DiscrepancyKind::MissingLinkGeometry, link.id.as_u64(), None);
            continue;
        };

        if let Some(node) = NetNodeStore::get(tx, tables, link.start)? {
            if let Some(p) = &node.geom {
                if disjoint_2d(line.first(), p) {
                    report.push(
                        DiscrepancyKind::GeometryStartMismatch,
                        link.id.as_u64(),
                        Some(node.id.as_u64()),
                    );
                }
            }
        }
        if let Some(node) = NetNodeStore::get(tx, tables, link.end)? {
            if let Some(p) = &node.geom {
                if disjoint_2d(line.last(), p) {
                    report.push(
                        DiscrepancyKind::GeometryEndMismatch,
                        link.id.as_u64(),
                        Some(node.id.as_u64()),
                    );
                }
            }
        }
    }

    Ok(report)
}

/// Planar disjointness through the kernel's intersection predicate.
fn disjoint_2d(a: &Point, b: &Point) -> bool {
    !a.to_geo().intersects(&b.to_geo())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrepancy_text_is_stable() {
        assert_eq!(DiscrepancyKind::NodeHasGeometry.to_string(), "node has geometry");
        assert_eq!(DiscrepancyKind::MissingLinkGeometry.to_string(), "missing link geometry");
        assert_eq!(DiscrepancyKind::GeometryStartMismatch.to_string(), "geometry start mismatch");
    }

    #[test]
    fn empty_report_is_valid() {
        let report = ValidityReport::default();
        assert!(report.is_valid());
        assert!(report.entries().is_empty());
    }
}
