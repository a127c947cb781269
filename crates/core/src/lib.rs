pub mod config;
pub mod domain;

pub use config::{AppConfig, ConfigError, ConfigOverrides, DirectoryBackend, LoadOptions};
pub use domain::shipment::{RiskSummary, ShipmentRecord, ShipmentStatus, AT_RISK_STATUS};
