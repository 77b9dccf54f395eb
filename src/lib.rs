//! Geotagged garbage-report intake and zone-based crew dispatch.
//!
//! The interesting machinery lives in [`zones`] (polygon catalog, zone-to-email
//! directory, crew roster) and [`reports`] (the report lifecycle service and its
//! HTTP surface). Everything else is the usual service plumbing: configuration,
//! telemetry, and a top-level error type for the binary.

pub mod config;
pub mod error;
pub mod reports;
pub mod telemetry;
pub mod zones;
