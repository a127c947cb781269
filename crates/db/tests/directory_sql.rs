use chrono::{Duration, Utc};
use tempfile::TempDir;

use freightwatch_core::domain::shipment::{ShipmentStatus, AT_RISK_STATUS};
use freightwatch_db::directory::ShipmentDirectory;
use freightwatch_db::{
    connect_with_settings, fixtures, migrations, DbPool, SqlShipmentDirectory,
};

async fn seeded_pool(dir: &TempDir) -> DbPool {
    let url = format!("sqlite://{}/freightwatch-test.db?mode=rwc", dir.path().display());
    let pool = connect_with_settings(&url, 1, 5).await.expect("pool should connect");
    migrations::run_pending(&pool).await.expect("migrations should apply");
    fixtures::seed_demo_data(&pool).await.expect("seed should succeed");
    pool
}

#[tokio::test]
async fn get_status_returns_the_record_matching_the_query_key() {
    let dir = TempDir::new().expect("tempdir");
    let pool = seeded_pool(&dir).await;
    let directory = SqlShipmentDirectory::with_pool(pool.clone());

    let record = directory
        .get_status("SHIP-REF-1003")
        .await
        .expect("query should not fault")
        .expect("seeded reference should resolve");

    assert_eq!(record.reference_no, "SHIP-REF-1003");
    assert_eq!(record.status, ShipmentStatus::AtRisk);
    assert_eq!(record.event, "DELAYED");
    assert_eq!(record.current_location, "Port of Singapore");
    assert_eq!(record.unlocode.as_deref(), Some("SGSIN"));
    assert!(record.details.contains("weather"));

    pool.close().await;
}

#[tokio::test]
async fn get_status_for_unknown_reference_is_none_not_a_fault() {
    let dir = TempDir::new().expect("tempdir");
    let pool = seeded_pool(&dir).await;
    let directory = SqlShipmentDirectory::with_pool(pool.clone());

    let result =
        directory.get_status("SHIP-REF-9999").await.expect("query should not fault");
    assert!(result.is_none());

    pool.close().await;
}

#[tokio::test]
async fn find_at_risk_filters_on_status_and_orders_eta_descending_nulls_last() {
    let dir = TempDir::new().expect("tempdir");
    let pool = seeded_pool(&dir).await;

    let now = Utc::now();
    for (reference_no, eta, eta_status) in [
        ("SHIP-REF-4001", Some(now + Duration::days(10)), AT_RISK_STATUS),
        ("SHIP-REF-4002", None, AT_RISK_STATUS),
        ("SHIP-REF-4003", Some(now + Duration::days(20)), "ON_TIME"),
    ] {
        sqlx::query(
            "INSERT INTO eta_risk (reference_no, eta, eta_final, eta_status) \
             VALUES (?1, ?2, NULL, ?3)",
        )
        .bind(reference_no)
        .bind(eta)
        .bind(eta_status)
        .execute(&pool)
        .await
        .expect("insert should succeed");
    }

    let directory = SqlShipmentDirectory::with_pool(pool.clone());
    let entries = directory.find_at_risk().await.expect("query should not fault");

    assert!(entries.iter().all(|entry| entry.eta_status == AT_RISK_STATUS));
    let references: Vec<&str> = entries.iter().map(|entry| entry.reference_no.as_str()).collect();
    // Seeded SHIP-REF-1003 sits at +3 days, between the two inserted entries.
    assert_eq!(references, vec!["SHIP-REF-4001", "SHIP-REF-1003", "SHIP-REF-4002"]);
    assert!(entries.last().expect("non-empty").eta.is_none());

    pool.close().await;
}

#[tokio::test]
async fn find_at_risk_with_no_qualifying_rows_is_an_explicit_empty_result() {
    let dir = TempDir::new().expect("tempdir");
    let pool = seeded_pool(&dir).await;

    sqlx::query("DELETE FROM eta_risk").execute(&pool).await.expect("delete should succeed");

    let directory = SqlShipmentDirectory::with_pool(pool.clone());
    let entries = directory.find_at_risk().await.expect("query should not fault");
    assert!(entries.is_empty());

    pool.close().await;
}

#[tokio::test]
async fn seeding_twice_keeps_one_row_per_reference() {
    let dir = TempDir::new().expect("tempdir");
    let pool = seeded_pool(&dir).await;

    fixtures::seed_demo_data(&pool).await.expect("reseed should succeed");

    let (shipment_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM shipments")
            .fetch_one(&pool)
            .await
            .expect("count should succeed");
    assert_eq!(shipment_count, 3);

    let (risk_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM eta_risk WHERE eta_status = ?1",
    )
    .bind(AT_RISK_STATUS)
    .fetch_one(&pool)
    .await
    .expect("count should succeed");
    assert_eq!(risk_count, 1);

    pool.close().await;
}
