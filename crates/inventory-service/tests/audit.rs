//! Audit log integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn audit_requires_auth() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/audit").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn create_writes_added_entry() {
    let harness = TestHarness::new();
    let item = harness
        .create_item(json!({ "category": "Laptop", "item_name": "XPS" }))
        .await;

    let entries = harness.audit_entries(None).await;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "added");
    assert_eq!(entries[0]["uid_no"], item["uid_no"]);
    assert_eq!(entries[0]["item_id"], item["id"]);
    assert_eq!(entries[0]["user_id"], harness.test_user_id.to_string());
}

#[tokio::test]
async fn entries_are_newest_first() {
    let harness = TestHarness::new();
    let item = harness
        .create_item(json!({ "category": "Laptop", "item_name": "XPS" }))
        .await;
    let uid = item["uid_no"].as_str().unwrap();

    harness
        .server
        .post(&format!("/v1/items/{uid}/status"))
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "status": "in_use" }))
        .await
        .assert_status_ok();

    let entries = harness.audit_entries(Some(uid)).await;
    let actions: Vec<_> = entries.iter().map(|e| e["action"].clone()).collect();
    assert_eq!(actions, vec![json!("status_change"), json!("added")]);
    assert_eq!(entries[0]["old_value"], "Available");
    assert_eq!(entries[0]["new_value"], "In Use");
}

#[tokio::test]
async fn deleted_item_keeps_uid_but_loses_reference() {
    let harness = TestHarness::new();
    let item = harness
        .create_item(json!({ "category": "Monitor", "item_name": "U2720Q" }))
        .await;
    let uid = item["uid_no"].as_str().unwrap();

    harness
        .server
        .delete(&format!("/v1/items/{uid}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let entries = harness.audit_entries(Some(uid)).await;
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(entry["uid_no"], uid);
        assert!(entry["item_id"].is_null());
    }
    assert_eq!(entries[0]["action"], "deleted");
    assert!(entries[0]["details"]
        .as_str()
        .unwrap()
        .contains(&format!("(UID: {uid})")));
}

#[tokio::test]
async fn field_edit_records_changed_fields() {
    let harness = TestHarness::new();
    let item = harness
        .create_item(json!({ "category": "Laptop", "item_name": "XPS" }))
        .await;
    let uid = item["uid_no"].as_str().unwrap();

    harness
        .server
        .put(&format!("/v1/items/{uid}"))
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "item_name": "XPS 15", "os": "Ubuntu" }))
        .await
        .assert_status_ok();

    let entries = harness.audit_entries(Some(uid)).await;
    assert_eq!(entries[0]["action"], "updated");
    assert_eq!(entries[0]["details"], "Updated fields: item_name, os");
}

#[tokio::test]
async fn noop_edit_writes_no_entry() {
    let harness = TestHarness::new();
    let item = harness
        .create_item(json!({ "category": "Laptop", "item_name": "XPS" }))
        .await;
    let uid = item["uid_no"].as_str().unwrap();

    harness
        .server
        .put(&format!("/v1/items/{uid}"))
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "item_name": "XPS" }))
        .await
        .assert_status_ok();

    assert_eq!(harness.audit_entries(Some(uid)).await.len(), 1);
}

#[tokio::test]
async fn reduce_to_zero_records_deletion() {
    let harness = TestHarness::new();
    let item = harness
        .create_item(json!({ "category": "Printer", "item_name": "LaserJet", "quantity": 2 }))
        .await;
    let uid = item["uid_no"].as_str().unwrap();
    let path = format!("/v1/items/{uid}/reduce");

    for (qty, reason) in [(1, "Toner leak"), (1, "Recycled")] {
        harness
            .server
            .post(&path)
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({ "quantity": qty, "reason": reason }))
            .await
            .assert_status_ok();
    }

    let entries = harness.audit_entries(Some(uid)).await;
    let actions: Vec<_> = entries.iter().map(|e| e["action"].clone()).collect();
    assert_eq!(
        actions,
        vec![json!("deleted"), json!("quantity_reduced"), json!("added")]
    );
    assert!(entries[1]["details"].as_str().unwrap().contains("Toner leak"));
    assert_eq!(entries[1]["old_value"], "2");
    assert_eq!(entries[1]["new_value"], "1");
}

#[tokio::test]
async fn login_and_logout_are_recorded() {
    let harness = TestHarness::new();

    for path in ["/v1/session/login", "/v1/session/logout"] {
        let response = harness
            .server
            .post(path)
            .add_header("authorization", harness.user_auth_header())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["recorded"], true);
    }

    let entries = harness.audit_entries(None).await;
    let actions: Vec<_> = entries.iter().map(|e| e["action"].clone()).collect();
    assert_eq!(actions, vec![json!("logout"), json!("login")]);
    assert!(entries[0]["uid_no"].is_null());
}

#[tokio::test]
async fn export_is_audited() {
    let harness = TestHarness::new();
    harness
        .create_item(json!({ "category": "Laptop", "item_name": "XPS" }))
        .await;

    harness
        .server
        .get("/v1/items/export")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let entries = harness.audit_entries(None).await;
    assert_eq!(entries[0]["action"], "exported");
    assert_eq!(entries[0]["details"], "Exported 1 items to CSV");
}
