use std::collections::BTreeMap;

use async_trait::async_trait;

use freightwatch_core::domain::shipment::{
    RiskSummary, ShipmentRecord, ShipmentStatus, AT_RISK_STATUS,
};

use crate::directory::{DirectoryError, ShipmentDirectory};
use crate::fixtures::demo_shipments;

/// Directory over a fixed in-memory dataset. Lookup is exact-key; the risk
/// view is a linear scan. There is no independent ETA aggregate in this
/// variant, so a risk entry's `eta` mirrors the latest event timestamp and
/// `eta_final` is absent.
pub struct InMemoryShipmentDirectory {
    records: BTreeMap<String, ShipmentRecord>,
}

impl InMemoryShipmentDirectory {
    pub fn new(records: impl IntoIterator<Item = ShipmentRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.reference_no.clone(), record))
                .collect(),
        }
    }

    pub fn with_demo_data() -> Self {
        Self::new(demo_shipments())
    }
}

#[async_trait]
impl ShipmentDirectory for InMemoryShipmentDirectory {
    async fn get_status(
        &self,
        reference_no: &str,
    ) -> Result<Option<ShipmentRecord>, DirectoryError> {
        Ok(self.records.get(reference_no).cloned())
    }

    async fn find_at_risk(&self) -> Result<Vec<RiskSummary>, DirectoryError> {
        let mut entries: Vec<RiskSummary> = self
            .records
            .values()
            .filter(|record| record.status == ShipmentStatus::AtRisk)
            .map(|record| RiskSummary {
                reference_no: record.reference_no.clone(),
                eta: Some(record.occurred_at),
                eta_final: None,
                eta_status: AT_RISK_STATUS.to_string(),
            })
            .collect();

        RiskSummary::sort_by_eta_desc(&mut entries);
        Ok(entries)
    }
}
