//! Shared data model and normalization logic for the Electrolux appliance exporter.

pub mod appliance;
pub mod error;
pub mod fanspeed;
pub mod resolve;
pub mod sample;
pub mod schema;

pub use appliance::{Appliance, ApplianceData, ApplianceId, ApplianceInfo, Reading, ReportedState};
pub use error::ApiError;
pub use fanspeed::{FanSpeed, FanSpeedTable};
pub use sample::MetricSample;
pub use schema::{MetricDesc, MetricKind};

/// Device type eligible for metric emission.
pub const AIR_PURIFIER: &str = "AIR_PURIFIER";

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
