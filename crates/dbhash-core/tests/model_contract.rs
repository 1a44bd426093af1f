use dbhash_core::{
    from_json_slice, is_system_database, to_canonical_json_bytes, Classification,
    ClusterInventory, DatabaseRecord, Level,
};

#[test]
fn decide_requires_exact_string_equality() {
    assert_eq!(
        Classification::decide(Level::Database, Some("abc"), Some("abc")),
        Classification::Match
    );
    assert_eq!(
        Classification::decide(Level::Database, Some("abc"), Some("ABC")),
        Classification::Mismatch
    );
    assert_eq!(
        Classification::decide(Level::Collection, Some("abc "), Some("abc")),
        Classification::Mismatch
    );
}

#[test]
fn decide_missing_variant_follows_level() {
    assert_eq!(
        Classification::decide(Level::Database, None, Some("x")),
        Classification::MissingDatabase
    );
    assert_eq!(
        Classification::decide(Level::Collection, Some("x"), None),
        Classification::MissingCollection
    );
    assert_eq!(
        Classification::decide(Level::Collection, None, None),
        Classification::MissingCollection
    );
    assert!(Classification::MissingDatabase.is_missing());
    assert!(!Classification::Mismatch.is_missing());
}

#[test]
fn classification_labels_are_stable() {
    let json = serde_json::to_string(&Classification::MissingCollection).expect("json");
    assert_eq!(json, "\"MISSING_COLLECTION\"");
    assert_eq!(Classification::MissingDatabase.to_string(), "MISSING_DATABASE");
    assert_eq!(Level::Collection.to_string(), "Collection");
}

#[test]
fn inventory_iterates_in_name_order() {
    let inventory = ClusterInventory::new()
        .with_database("zeta", DatabaseRecord::new("h1", "z"))
        .with_database("alpha", DatabaseRecord::new("h1", "a"))
        .with_database("Mixed", DatabaseRecord::new("h1", "m"));
    let names: Vec<_> = inventory.names().collect();
    assert_eq!(names, vec!["Mixed", "alpha", "zeta"]);
    assert_eq!(inventory.len(), 3);
}

#[test]
fn inventory_json_is_a_plain_mapping() {
    let inventory = ClusterInventory::new().with_database(
        "sales",
        DatabaseRecord::new("src:27017", "X")
            .with_collection("orders", "a1")
            .with_elapsed_ms(12),
    );
    let bytes = to_canonical_json_bytes(&inventory).expect("json");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("value");
    assert_eq!(value["sales"]["aggregate_digest"], "X");
    assert_eq!(value["sales"]["collections"]["orders"], "a1");
    let restored: ClusterInventory = from_json_slice(&bytes).expect("restore");
    assert_eq!(restored, inventory);
}

#[test]
fn system_databases_are_recognised() {
    for name in ["admin", "local", "config"] {
        assert!(is_system_database(name));
    }
    assert!(!is_system_database("Admin"));
    assert!(!is_system_database("sales"));
}
