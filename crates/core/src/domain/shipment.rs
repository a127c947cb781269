//! Read-only projections of the upstream shipment tracking data.
//!
//! Nothing in this system creates, updates, or deletes shipments; whatever
//! the backing store asserts is treated as ground truth. Status and event
//! are logically correlated but no transition table is enforced.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker value used by the ETA risk aggregate for at-risk entries.
pub const AT_RISK_STATUS: &str = "AT_RISK";

/// Carrier-reported shipment status. Carriers emit values beyond the three
/// well-known ones, so unrecognized codes are preserved verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShipmentStatus {
    InTransit,
    Delivered,
    AtRisk,
    Other(String),
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::AtRisk => "AT_RISK",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for ShipmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "IN_TRANSIT" => Self::InTransit,
            "DELIVERED" => Self::Delivered,
            "AT_RISK" => Self::AtRisk,
            _ => Self::Other(value),
        }
    }
}

impl From<ShipmentStatus> for String {
    fn from(value: ShipmentStatus) -> Self {
        value.as_str().to_string()
    }
}

/// One shipment's latest known state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub reference_no: String,
    pub status: ShipmentStatus,
    pub event: String,
    pub current_location: String,
    pub unlocode: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub details: String,
}

/// One entry of the ETA risk view. Computed independently of
/// [`ShipmentRecord`]; the shared `reference_no` is the only link and is not
/// guaranteed to resolve against the shipment table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub reference_no: String,
    pub eta: Option<DateTime<Utc>>,
    pub eta_final: Option<DateTime<Utc>>,
    pub eta_status: String,
}

impl RiskSummary {
    /// Orders risk entries by estimated arrival, newest first, entries
    /// without an ETA last.
    pub fn sort_by_eta_desc(entries: &mut [RiskSummary]) {
        entries.sort_by(|left, right| match (&left.eta, &right.eta) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{RiskSummary, ShipmentRecord, ShipmentStatus, AT_RISK_STATUS};

    fn risk_entry(reference_no: &str, eta_hours_ago: Option<i64>) -> RiskSummary {
        RiskSummary {
            reference_no: reference_no.to_string(),
            eta: eta_hours_ago.map(|hours| Utc::now() - Duration::hours(hours)),
            eta_final: None,
            eta_status: AT_RISK_STATUS.to_string(),
        }
    }

    #[test]
    fn status_round_trips_well_known_codes() {
        for code in ["IN_TRANSIT", "DELIVERED", "AT_RISK"] {
            let status = ShipmentStatus::from(code.to_string());
            assert_eq!(status.as_str(), code);
        }
    }

    #[test]
    fn status_preserves_carrier_defined_codes() {
        let status = ShipmentStatus::from("CUSTOMS_HOLD".to_string());
        assert_eq!(status, ShipmentStatus::Other("CUSTOMS_HOLD".to_string()));
        assert_eq!(status.as_str(), "CUSTOMS_HOLD");
    }

    #[test]
    fn record_serializes_status_as_upstream_code() {
        let record = ShipmentRecord {
            reference_no: "SHIP-REF-1003".to_string(),
            status: ShipmentStatus::AtRisk,
            event: "DELAYED".to_string(),
            current_location: "Port of Singapore".to_string(),
            unlocode: Some("SGSIN".to_string()),
            occurred_at: Utc::now(),
            details: "Vessel delayed due to weather conditions".to_string(),
        };

        let json = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(json["status"], "AT_RISK");
        assert_eq!(json["reference_no"], "SHIP-REF-1003");
        assert_eq!(json["unlocode"], "SGSIN");
    }

    #[test]
    fn risk_entries_sort_eta_descending_with_missing_etas_last() {
        let mut entries = vec![
            risk_entry("SHIP-REF-2001", None),
            risk_entry("SHIP-REF-2002", Some(48)),
            risk_entry("SHIP-REF-2003", Some(2)),
            risk_entry("SHIP-REF-2004", None),
        ];

        RiskSummary::sort_by_eta_desc(&mut entries);

        assert_eq!(entries[0].reference_no, "SHIP-REF-2003");
        assert_eq!(entries[1].reference_no, "SHIP-REF-2002");
        assert!(entries[2].eta.is_none());
        assert!(entries[3].eta.is_none());
    }
}
