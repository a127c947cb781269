//! Demo dataset shared by the in-memory directory and the database seeder.

use chrono::{Duration, Utc};

use freightwatch_core::domain::shipment::{RiskSummary, ShipmentRecord, ShipmentStatus, AT_RISK_STATUS};

use crate::connection::DbPool;
use crate::directory::DirectoryError;

const DEMO_REFERENCES: &[&str] = &["SHIP-REF-1001", "SHIP-REF-1002", "SHIP-REF-1003"];

/// Three shipments covering the in-transit, delivered, and at-risk states.
/// Timestamps are relative to seeding time so the data always reads as
/// recent activity.
pub fn demo_shipments() -> Vec<ShipmentRecord> {
    let now = Utc::now();
    vec![
        ShipmentRecord {
            reference_no: "SHIP-REF-1001".to_string(),
            status: ShipmentStatus::InTransit,
            event: "DEPARTED".to_string(),
            current_location: "Port of Los Angeles".to_string(),
            unlocode: Some("USLAX".to_string()),
            occurred_at: now - Duration::days(2),
            details: "Container loaded on vessel MSC MAYA".to_string(),
        },
        ShipmentRecord {
            reference_no: "SHIP-REF-1002".to_string(),
            status: ShipmentStatus::Delivered,
            event: "DELIVERED".to_string(),
            current_location: "Shanghai Distribution Center".to_string(),
            unlocode: Some("CNSHA".to_string()),
            occurred_at: now - Duration::hours(6),
            details: "Delivered to consignee".to_string(),
        },
        ShipmentRecord {
            reference_no: "SHIP-REF-1003".to_string(),
            status: ShipmentStatus::AtRisk,
            event: "DELAYED".to_string(),
            current_location: "Port of Singapore".to_string(),
            unlocode: Some("SGSIN".to_string()),
            occurred_at: now - Duration::hours(12),
            details: "Vessel delayed due to weather conditions".to_string(),
        },
    ]
}

/// ETA risk rows matching the demo shipments. The aggregate is populated
/// independently of the shipment tables, so it carries its own status
/// column and one on-time row that the risk query must filter out.
pub fn demo_risk_entries() -> Vec<RiskSummary> {
    let now = Utc::now();
    vec![
        RiskSummary {
            reference_no: "SHIP-REF-1001".to_string(),
            eta: Some(now + Duration::days(9)),
            eta_final: None,
            eta_status: "ON_TIME".to_string(),
        },
        RiskSummary {
            reference_no: "SHIP-REF-1003".to_string(),
            eta: Some(now + Duration::days(3)),
            eta_final: Some(now + Duration::days(6)),
            eta_status: AT_RISK_STATUS.to_string(),
        },
    ]
}

/// Loads the demo dataset. Idempotent: existing rows for the fixed
/// reference set are removed before inserting.
pub async fn seed_demo_data(pool: &DbPool) -> Result<(), DirectoryError> {
    for reference_no in DEMO_REFERENCES {
        sqlx::query(
            "DELETE FROM shipment_events WHERE shipment_id IN \
             (SELECT shipment_id FROM shipments WHERE reference_no = ?1)",
        )
        .bind(reference_no)
        .execute(pool)
        .await?;
        sqlx::query("DELETE FROM shipments WHERE reference_no = ?1")
            .bind(reference_no)
            .execute(pool)
            .await?;
        sqlx::query("DELETE FROM eta_risk WHERE reference_no = ?1")
            .bind(reference_no)
            .execute(pool)
            .await?;
    }

    for record in demo_shipments() {
        sqlx::query("DELETE FROM locations WHERE name = ?1")
            .bind(&record.current_location)
            .execute(pool)
            .await?;
        let location_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO locations (name, unlocode) VALUES (?1, ?2) RETURNING location_id",
        )
        .bind(&record.current_location)
        .bind(&record.unlocode)
        .fetch_one(pool)
        .await?;

        let shipment_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO shipments (reference_no, status) VALUES (?1, ?2) RETURNING shipment_id",
        )
        .bind(&record.reference_no)
        .bind(record.status.as_str())
        .fetch_one(pool)
        .await?;

        sqlx::query(
            "INSERT INTO shipment_events (shipment_id, event, location_id, occurred_at, details) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(shipment_id)
        .bind(&record.event)
        .bind(location_id)
        .bind(record.occurred_at)
        .bind(&record.details)
        .execute(pool)
        .await?;
    }

    for entry in demo_risk_entries() {
        sqlx::query(
            "INSERT INTO eta_risk (reference_no, eta, eta_final, eta_status) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&entry.reference_no)
        .bind(entry.eta)
        .bind(entry.eta_final)
        .bind(&entry.eta_status)
        .execute(pool)
        .await?;
    }

    Ok(())
}
