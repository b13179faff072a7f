//! Integration tests for reading large objects.

mod common;

use common::{lob, FakeDriver, ResultSet};
use oracle_adapter::driver::constants::{ORA_TYPE_NUM_BLOB, ORA_TYPE_NUM_CLOB, ORA_TYPE_NUM_NUMBER};
use oracle_adapter::types::{LobKind, LobLocator, LobValue, NativeValue};
use oracle_adapter::{Value, WRITABLE_LOB_QUERY};
use tokio_test::assert_err;

fn documents() -> ResultSet {
    ResultSet::new(&[
        ("ID", ORA_TYPE_NUM_NUMBER),
        ("BODY", ORA_TYPE_NUM_CLOB),
        ("SCAN", ORA_TYPE_NUM_BLOB),
    ])
    .row(vec![
        NativeValue::from(1i64),
        lob(LobKind::Clob, b"body-1"),
        lob(LobKind::Blob, b"scan-1"),
    ])
}

#[tokio::test]
async fn test_lobs_are_read_in_full() {
    let driver = FakeDriver::new();
    driver.respond("FROM documents", documents());
    driver.store_lob(b"body-1", "grüße".as_bytes());
    driver.store_lob(b"scan-1", &[0, 1, 2, 255]);
    let mut conn = driver.connect().await;

    let row = conn
        .query_one("SELECT id, body, scan FROM documents")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row.get("body"), Some(&Value::String("grüße".into())));
    assert_eq!(row.get("scan"), Some(&Value::Binary(vec![0, 1, 2, 255])));
    assert_eq!(driver.state().lob_reads, 2);
}

#[tokio::test]
async fn test_prefetched_lob_data_skips_round_trip() {
    let driver = FakeDriver::new();
    let locator = LobLocator::new(LobKind::Clob, b"inline".to_vec(), 5, 8132);
    driver.respond(
        "FROM notes",
        ResultSet::new(&[("BODY", ORA_TYPE_NUM_CLOB)]).row(vec![NativeValue::Lob(
            LobValue::with_data(locator, b"hello".to_vec()),
        )]),
    );
    let mut conn = driver.connect().await;

    let value = conn.select_value("SELECT body FROM notes").await.unwrap();
    assert_eq!(value, Some(Value::String("hello".into())));
    assert_eq!(driver.state().lob_reads, 0);
}

#[tokio::test]
async fn test_writable_hint_returns_locators() {
    let driver = FakeDriver::new();
    driver.respond("FROM documents", documents());
    let mut conn = driver.connect().await;

    let result = conn
        .query(
            "SELECT body, scan FROM documents WHERE id = 1 FOR UPDATE",
            Some(WRITABLE_LOB_QUERY),
        )
        .await
        .unwrap();
    let row = &result.rows[0];

    let body = row.get("body").and_then(Value::as_lob).unwrap();
    assert_eq!(body.kind(), LobKind::Clob);
    assert_eq!(body.locator.locator, b"body-1".to_vec());
    assert!(matches!(row.get("scan"), Some(Value::Lob(l)) if l.locator.is_blob()));
    assert_eq!(driver.state().lob_reads, 0);
}

#[tokio::test]
async fn test_other_hints_read_contents() {
    let driver = FakeDriver::new();
    driver.respond("FROM documents", documents());
    let mut conn = driver.connect().await;

    let result = conn
        .query("SELECT * FROM documents", Some("Document Load"))
        .await
        .unwrap();
    assert_eq!(result.rows[0].get("body"), Some(&Value::String(String::new())));
}

#[tokio::test]
async fn test_lob_read_failure_is_resource_error() {
    let driver = FakeDriver::new();
    driver.respond("FROM documents", documents());
    driver.state().faults.read_lob = true;
    let mut conn = driver.connect().await;

    let err = assert_err!(conn.query("SELECT * FROM documents", None).await);
    assert!(err.is_resource(), "{:?}", err);
    assert!(err.to_string().contains("ORA-22275"));

    let state = driver.state();
    assert_eq!(state.cursors_opened, state.cursors_closed);
}

#[tokio::test]
async fn test_invalid_utf8_clob_is_resource_error() {
    let driver = FakeDriver::new();
    driver.respond("FROM documents", documents());
    driver.store_lob(b"body-1", &[0xC3, 0x28]);
    let mut conn = driver.connect().await;

    let err = assert_err!(conn.query("SELECT * FROM documents", None).await);
    assert!(err.is_resource());
}
