pub mod connection;
pub mod directory;
pub mod fixtures;
pub mod memory;
pub mod migrations;

pub use connection::{connect_with_settings, ping, ConnectionSettings, DbPool, LazyPool};
pub use directory::{DirectoryError, ShipmentDirectory, SqlShipmentDirectory};
pub use memory::InMemoryShipmentDirectory;
