//! Administrative zones: the polygon catalog reports are resolved against, the
//! zone-to-email notification directory, and the crew roster binding zones to
//! workers.

pub mod catalog;
pub mod directory;
pub mod roster;

pub use catalog::{CatalogError, ZoneCatalog, ZonePolygon, ZoneResolution};
pub use directory::{DirectoryError, ZoneDirectory};
pub use roster::{RosterError, WorkerProfile, WorkerRegistry, WorkerRoster};
