mod common;

use std::collections::BTreeMap;

use common::*;

use plangap::ScoreError;
use plangap::aggregate::collect_districts;
use plangap::plan::{self, DistrictTotals};
use plangap::store::MemStore;

const UPLOAD: &str = "agg-upload";

fn put_district(store: &MemStore, index: usize, fields: &[(&str, f64)], tiles: &[&str]) {
    let district = DistrictTotals::new(
        fields.iter().map(|(name, value)| (name.to_string(), *value)).collect(),
        tiles.iter().map(|t| t.to_string()).collect(),
    );
    store.insert(
        &plan::district_key(UPLOAD, index),
        serde_json::to_vec(&district).unwrap(),
    );
}

#[test]
fn orders_by_key_index_not_discovery_order() {
    let store = MemStore::new();
    // Lexicographic listing puts "10.json" before "2.json"; the numeric
    // index in the key must win.
    put_district(&store, 10, &[("Voters", 1.0)], &[]);
    put_district(&store, 2, &[("Voters", 2.0)], &[]);
    put_district(&store, 0, &[("Voters", 3.0)], &[]);

    let districts = collect_districts(&store, UPLOAD, &test_config()).unwrap();
    let voters: Vec<f64> = districts.iter().map(|d| d.get("Voters")).collect();
    assert_eq!(voters, vec![3.0, 2.0, 1.0]);
}

#[test]
fn missing_districts_are_absent_not_errors() {
    let store = MemStore::new();
    put_district(&store, 0, &[("Voters", 1.0)], &[]);
    put_district(&store, 3, &[("Voters", 4.0)], &[]);

    let districts = collect_districts(&store, UPLOAD, &test_config()).unwrap();
    assert_eq!(districts.len(), 2);
    assert_eq!(districts[0].get("Voters"), 1.0);
    assert_eq!(districts[1].get("Voters"), 4.0);
}

#[test]
fn no_results_yet_yields_an_empty_list() {
    let store = MemStore::new();
    assert!(collect_districts(&store, UPLOAD, &test_config()).unwrap().is_empty());
}

#[test]
fn corrupt_object_is_fatal() {
    let store = MemStore::new();
    put_district(&store, 0, &[("Voters", 1.0)], &[]);
    store.insert(&plan::district_key(UPLOAD, 1), b"not json".to_vec());

    let result = collect_districts(&store, UPLOAD, &test_config());
    assert!(matches!(result, Err(ScoreError::Parse { .. })));
}

#[test]
fn storage_failure_is_fatal() {
    let result = collect_districts(&FailingStore, UPLOAD, &test_config());
    assert!(matches!(result, Err(ScoreError::Storage(_))));
}

#[test]
fn values_are_rounded_to_fixed_precision() {
    let store = MemStore::new();
    put_district(&store, 0, &[("Voters", 0.1 + 0.2)], &[]);
    put_district(&store, 1, &[("Voters", 1.000_000_49)], &[]);

    let districts = collect_districts(&store, UPLOAD, &test_config()).unwrap();
    assert_eq!(districts[0].get("Voters"), 0.3);
    assert_eq!(districts[1].get("Voters"), 1.0);
}

#[test]
fn gzipped_district_objects_are_read() {
    let store = MemStore::new();
    let district = DistrictTotals::new(
        BTreeMap::from([("Voters".to_string(), 7.0)]),
        vec!["10/511/511".to_string()],
    );
    store.insert(
        &plan::district_key(UPLOAD, 0),
        gzip(&serde_json::to_vec(&district).unwrap()),
    );

    let districts = collect_districts(&store, UPLOAD, &test_config()).unwrap();
    assert_eq!(districts.len(), 1);
    assert_eq!(districts[0].get("Voters"), 7.0);
    assert_eq!(districts[0].tiles, vec!["10/511/511"]);
}

#[test]
fn foreign_keys_under_the_prefix_are_ignored() {
    let store = MemStore::new();
    put_district(&store, 0, &[("Voters", 1.0)], &[]);
    store.insert(
        &format!("{}notes.txt", plan::district_prefix(UPLOAD)),
        b"scratch".to_vec(),
    );

    let districts = collect_districts(&store, UPLOAD, &test_config()).unwrap();
    assert_eq!(districts.len(), 1);
}
