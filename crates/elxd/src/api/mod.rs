//! Cloud API abstraction.
//!
//! The collector only talks to the cloud through [`ApplianceApi`], so tests
//! can drive it with [`FakeApplianceApi`] instead of the HTTP client.

mod fake;
mod ocp;

pub use fake::FakeApplianceApi;
pub use ocp::{OcpClient, OcpConfig};

use async_trait::async_trait;
use elx_common::{ApiError, Appliance, ApplianceId, ApplianceInfo};

#[async_trait]
pub trait ApplianceApi: Send + Sync {
    /// List appliances of the account, optionally with their reported state.
    async fn list_appliances(&self, include_state: bool) -> Result<Vec<Appliance>, ApiError>;

    /// Fetch descriptive info for a batch of appliances in one call.
    async fn appliance_info(&self, ids: &[ApplianceId]) -> Result<Vec<ApplianceInfo>, ApiError>;
}
