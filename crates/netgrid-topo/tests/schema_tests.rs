//! Integration tests for schema management.

use netgrid_core::encoding::keys;
use netgrid_core::{NetworkConfig, NetworkKind};
use netgrid_storage::backends::RedbEngine;
use netgrid_storage::{StorageEngine, Transaction};
use netgrid_topo::schema::{self, NetTables, TABLE_CATALOG};
use netgrid_topo::store::RegistryStore;
use netgrid_topo::TopoError;

fn create_test_engine() -> RedbEngine {
    RedbEngine::in_memory().expect("failed to create in-memory engine")
}

fn spatial_config(name: &str) -> NetworkConfig {
    NetworkConfig::new(name, NetworkKind::Spatial, 4326, false, false)
}

#[test]
fn create_then_validate() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    schema::create_network(&mut tx, &spatial_config("roads")).expect("create");
    tx.commit().expect("commit");

    let tx = engine.begin_read().expect("begin read");
    let info = schema::validate_existing(&tx, "roads", true).expect("full check");
    assert_eq!(info.config.name, "roads");
    assert_eq!(info.next_node_id, 1);
    assert_eq!(info.next_link_id, 1);
}

#[test]
fn create_drop_round_trip_leaves_nothing_behind() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    schema::create_network(&mut tx, &spatial_config("roads")).expect("create");
    schema::drop_network(&mut tx, "roads").expect("drop");
    tx.commit().expect("commit");

    let tx = engine.begin_read().expect("begin read");
    assert!(RegistryStore::get(&tx, "roads").expect("registry read").is_none());

    let tables = NetTables::for_network("roads");
    for (object, _) in tables.objects() {
        assert!(
            tx.get(TABLE_CATALOG, &keys::name_key(object)).expect("catalog read").is_none(),
            "catalog entry for {object} should be gone"
        );
    }
    for table in tables.all() {
        assert!(tx.scan_table(table).expect("scan").is_empty(), "{table} should be empty");
    }
}

#[test]
fn duplicate_name_is_a_conflict() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    schema::create_network(&mut tx, &spatial_config("roads")).expect("create");
    let result = schema::create_network(&mut tx, &spatial_config("roads"));
    assert!(matches!(result, Err(TopoError::NameConflict(_))));
}

#[test]
fn colliding_object_name_is_a_conflict() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    // A foreign catalog entry occupies one of the derived object names.
    tx.put(TABLE_CATALOG, &keys::name_key("rail_node"), b"occupied").expect("put");

    let result = schema::create_network(&mut tx, &spatial_config("rail"));
    assert!(matches!(result, Err(TopoError::NameConflict(name)) if name == "rail_node"));
}

#[test]
fn drop_of_unknown_network_fails() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    let result = schema::drop_network(&mut tx, "ghost");
    assert!(matches!(result, Err(TopoError::InvalidNetworkName(_))));
}

#[test]
fn full_check_detects_a_missing_schema_object() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    schema::create_network(&mut tx, &spatial_config("roads")).expect("create");
    let tables = NetTables::for_network("roads");
    tx.delete(TABLE_CATALOG, &keys::name_key(&tables.links)).expect("delete");
    tx.commit().expect("commit");

    let tx = engine.begin_read().expect("begin read");
    // The registry-only probe still passes...
    schema::validate_existing(&tx, "roads", false).expect("registry check");
    // ...the full check does not.
    let result = schema::validate_existing(&tx, "roads", true);
    assert!(matches!(result, Err(TopoError::InvalidNetworkName(_))));
}

#[test]
fn logical_networks_have_no_geometry_registrations() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    let config = NetworkConfig::new("log", NetworkKind::Logical, -1, false, false);
    schema::create_network(&mut tx, &config).expect("create");
    tx.commit().expect("commit");

    let tx = engine.begin_read().expect("begin read");
    let tables = NetTables::for_network("log");
    for table in tables.geometry_tables() {
        assert!(tx
            .get(schema::TABLE_GEOMETRIES, &keys::name_key(table))
            .expect("geometry registry read")
            .is_none());
    }
    schema::validate_existing(&tx, "log", true).expect("full check");
}
