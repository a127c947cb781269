use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use freightwatch_core::domain::shipment::{
    RiskSummary, ShipmentRecord, ShipmentStatus, AT_RISK_STATUS,
};

use crate::connection::{DbPool, LazyPool};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

/// Read-only query capability over the shipment tracking data.
///
/// Both operations treat "nothing matched" as a normal outcome, never an
/// error: `get_status` answers `Ok(None)` for an unknown reference and
/// `find_at_risk` answers an empty vec when no entry qualifies.
#[async_trait]
pub trait ShipmentDirectory: Send + Sync {
    /// Latest known state for one shipment, looked up by its reference.
    async fn get_status(
        &self,
        reference_no: &str,
    ) -> Result<Option<ShipmentRecord>, DirectoryError>;

    /// All currently at-risk entries, ordered by ETA descending with
    /// entries lacking an ETA last.
    async fn find_at_risk(&self) -> Result<Vec<RiskSummary>, DirectoryError>;
}

const STATUS_QUERY: &str = "\
SELECT
    s.reference_no,
    s.status,
    le.event,
    loc.name AS current_location,
    loc.unlocode,
    le.occurred_at,
    le.details
FROM shipments s
JOIN v_shipment_latest_event le ON le.shipment_id = s.shipment_id
LEFT JOIN locations loc ON loc.location_id = le.location_id
WHERE s.reference_no = ?1";

// `eta IS NULL` sorts false before true, pushing missing ETAs last.
const AT_RISK_QUERY: &str = "\
SELECT
    r.reference_no,
    r.eta,
    r.eta_final,
    r.eta_status
FROM eta_risk r
WHERE r.eta_status = ?1
ORDER BY r.eta IS NULL, r.eta DESC";

/// Directory over the relational read model, reached through a
/// lazily-established pool.
pub struct SqlShipmentDirectory {
    pool: LazyPool,
}

impl SqlShipmentDirectory {
    pub fn new(pool: LazyPool) -> Self {
        Self { pool }
    }

    pub fn with_pool(pool: DbPool) -> Self {
        Self { pool: LazyPool::from_pool(pool) }
    }
}

#[derive(sqlx::FromRow)]
struct StatusRow {
    reference_no: String,
    status: String,
    event: String,
    current_location: Option<String>,
    unlocode: Option<String>,
    occurred_at: DateTime<Utc>,
    details: String,
}

impl From<StatusRow> for ShipmentRecord {
    fn from(row: StatusRow) -> Self {
        Self {
            reference_no: row.reference_no,
            status: ShipmentStatus::from(row.status),
            event: row.event,
            current_location: row.current_location.unwrap_or_default(),
            unlocode: row.unlocode,
            occurred_at: row.occurred_at,
            details: row.details,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RiskRow {
    reference_no: String,
    eta: Option<DateTime<Utc>>,
    eta_final: Option<DateTime<Utc>>,
    eta_status: String,
}

impl From<RiskRow> for RiskSummary {
    fn from(row: RiskRow) -> Self {
        Self {
            reference_no: row.reference_no,
            eta: row.eta,
            eta_final: row.eta_final,
            eta_status: row.eta_status,
        }
    }
}

#[async_trait]
impl ShipmentDirectory for SqlShipmentDirectory {
    async fn get_status(
        &self,
        reference_no: &str,
    ) -> Result<Option<ShipmentRecord>, DirectoryError> {
        let pool = self.pool.get().await?;
        let row = sqlx::query_as::<_, StatusRow>(STATUS_QUERY)
            .bind(reference_no)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(ShipmentRecord::from))
    }

    async fn find_at_risk(&self) -> Result<Vec<RiskSummary>, DirectoryError> {
        let pool = self.pool.get().await?;
        let rows = sqlx::query_as::<_, RiskRow>(AT_RISK_QUERY)
            .bind(AT_RISK_STATUS)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(RiskSummary::from).collect())
    }
}
