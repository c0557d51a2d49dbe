//! Integration tests for the validity checker.
//!
//! Discrepancies are injected through the element stores, below the
//! mutation protocol, the same way external writes would corrupt a live
//! database.

use netgrid_core::{Geometry, Line, NetLink, NetworkKind, Point};
use netgrid_storage::backends::RedbEngine;
use netgrid_storage::{StorageEngine, Transaction};
use netgrid_topo::schema::NetTables;
use netgrid_topo::store::{NetLinkStore, NetNodeStore};
use netgrid_topo::{DiscrepancyKind, NetworkManager, TopoError};

const SRID: i32 = 4326;

fn create_test_engine() -> RedbEngine {
    RedbEngine::in_memory().expect("failed to create in-memory engine")
}

fn point(x: f64, y: f64) -> Geometry {
    Geometry::point(SRID, x, y)
}

fn line(coords: &[(f64, f64)]) -> Geometry {
    Geometry::line_from_coords(SRID, coords).expect("valid line")
}

fn raw_line(coords: &[(f64, f64)]) -> Line {
    Line::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).expect("valid line")
}

/// A populated spatial network: two nodes, one link.
fn build_spatial(manager: &mut NetworkManager, tx: &mut impl Transaction) -> NetTables {
    manager.create_network(tx, "net", NetworkKind::Spatial, SRID, false, false).expect("create");
    let a = manager.add_iso_net_node(tx, "net", Some(&point(0.0, 0.0))).expect("a");
    let b = manager.add_iso_net_node(tx, "net", Some(&point(10.0, 0.0))).expect("b");
    manager.add_link(tx, "net", a, b, Some(&line(&[(0.0, 0.0), (10.0, 0.0)]))).expect("link");
    NetTables::for_network("net")
}

#[test]
fn fresh_spatial_network_is_valid() {
    let engine = create_test_engine();
    let mut manager = NetworkManager::new();

    let mut tx = engine.begin_write().expect("begin write");
    build_spatial(&mut manager, &mut tx);

    let report = manager.check_spatial_net(&tx, "net").expect("check");
    assert!(report.is_valid());
}

#[test]
fn nulled_node_geometry_is_reported_once() {
    let engine = create_test_engine();
    let mut manager = NetworkManager::new();

    let mut tx = engine.begin_write().expect("begin write");
    let tables = build_spatial(&mut manager, &mut tx);

    // The moral equivalent of `UPDATE net_node SET geometry = NULL`.
    let victim = NetNodeStore::all(&tx, &tables).expect("all")[0].id;
    NetNodeStore::update_geom(&mut tx, &tables, victim, None).expect("null out");

    let report = manager.check_spatial_net(&tx, "net").expect("check");
    let missing: Vec<_> = report
        .entries()
        .iter()
        .filter(|d| d.kind == DiscrepancyKind::MissingNodeGeometry)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].primitive1, victim.as_u64());
}

#[test]
fn shifted_link_geometry_is_an_endpoint_mismatch() {
    let engine = create_test_engine();
    let mut manager = NetworkManager::new();

    let mut tx = engine.begin_write().expect("begin write");
    let tables = build_spatial(&mut manager, &mut tx);

    let old = NetLinkStore::all(&tx, &tables).expect("all")[0].clone();
    let skewed = NetLink::new(old.id, old.start, old.end, Some(raw_line(&[(1.0, 1.0), (10.0, 0.0)])));
    NetLinkStore::update(&mut tx, &tables, &old, &skewed).expect("skew");

    let report = manager.check_spatial_net(&tx, "net").expect("check");
    assert!(!report.is_valid());
    let entry = report
        .entries()
        .iter()
        .find(|d| d.kind == DiscrepancyKind::GeometryStartMismatch)
        .expect("start mismatch reported");
    assert_eq!(entry.primitive1, old.id.as_u64());
    assert_eq!(entry.primitive2, Some(old.start.as_u64()));

    // The end vertex still touches its node, so only the start is flagged.
    assert!(!report
        .entries()
        .iter()
        .any(|d| d.kind == DiscrepancyKind::GeometryEndMismatch));
}

#[test]
fn all_discrepancies_are_collected_in_one_pass() {
    let engine = create_test_engine();
    let mut manager = NetworkManager::new();

    let mut tx = engine.begin_write().expect("begin write");
    let tables = build_spatial(&mut manager, &mut tx);

    let nodes = NetNodeStore::all(&tx, &tables).expect("all");
    NetNodeStore::update_geom(&mut tx, &tables, nodes[0].id, None).expect("null a");
    NetNodeStore::update_geom(&mut tx, &tables, nodes[1].id, None).expect("null b");

    let report = manager.check_spatial_net(&tx, "net").expect("check");
    let missing = report
        .entries()
        .iter()
        .filter(|d| d.kind == DiscrepancyKind::MissingNodeGeometry)
        .count();
    assert_eq!(missing, 2, "the scan must not stop at the first finding");
}

#[test]
fn logical_network_with_geometry_is_flagged() {
    let engine = create_test_engine();
    let mut manager = NetworkManager::new();

    let mut tx = engine.begin_write().expect("begin write");
    manager.create_network(&mut tx, "log", NetworkKind::Logical, -1, false, false).expect("create");
    let a = manager.add_iso_net_node(&mut tx, "log", None).expect("a");
    let b = manager.add_iso_net_node(&mut tx, "log", None).expect("b");
    let l = manager.add_link(&mut tx, "log", a, b, None).expect("link");

    let tables = NetTables::for_network("log");
    NetNodeStore::update_geom(&mut tx, &tables, a, Some(Point::new(1.0, 2.0))).expect("inject");
    let old = NetLinkStore::get(&tx, &tables, l).expect("get").expect("present");
    let with_geom = NetLink::new(old.id, old.start, old.end, Some(raw_line(&[(0.0, 0.0), (1.0, 1.0)])));
    NetLinkStore::update(&mut tx, &tables, &old, &with_geom).expect("inject");

    let report = manager.check_logical_net(&tx, "log").expect("check");
    let kinds: Vec<_> = report.entries().iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiscrepancyKind::NodeHasGeometry));
    assert!(kinds.contains(&DiscrepancyKind::LinkHasGeometry));
}

#[test]
fn checks_are_restricted_to_their_network_kind() {
    let engine = create_test_engine();
    let mut manager = NetworkManager::new();

    let mut tx = engine.begin_write().expect("begin write");
    build_spatial(&mut manager, &mut tx);

    let err = manager.check_logical_net(&tx, "net").expect_err("wrong kind");
    assert!(matches!(err, TopoError::OperationKindMismatch { .. }));
    assert!(err.to_string().contains("check_spatial_net"));
}
