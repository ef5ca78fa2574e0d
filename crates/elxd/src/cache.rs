//! Appliance info cache.
//!
//! Maps a PNC to its descriptive info for the life of the collector. Entries
//! are written once and never refreshed or evicted, so an upstream correction
//! of a model's metadata is not picked up until restart.
//!
//! The cache has no lock of its own. The collector holds it inside its
//! collection mutex, which serializes every lookup and fill.

use crate::api::ApplianceApi;
use elx_common::{ApiError, Appliance, ApplianceId, ApplianceInfo};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct ApplianceInfoCache {
    infos: HashMap<String, ApplianceInfo>,
}

impl ApplianceInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, id: &ApplianceId) -> Option<&ApplianceInfo> {
        self.infos.get(id.pnc())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Identifiers among `appliances` whose info is not cached yet.
    ///
    /// Each PNC appears at most once.
    pub fn missing<'a, I>(&self, appliances: I) -> Vec<ApplianceId>
    where
        I: IntoIterator<Item = &'a Appliance>,
    {
        let mut seen = HashSet::new();
        appliances
            .into_iter()
            .filter(|a| !self.infos.contains_key(a.id.pnc()))
            .filter(|a| seen.insert(a.id.pnc().to_string()))
            .map(|a| a.id.clone())
            .collect()
    }

    /// Fetch and insert info for the identifiers not already cached.
    ///
    /// Issues at most one batched API call. Returns the number of new entries.
    pub async fn fill<A>(&mut self, api: &A, ids: &[ApplianceId]) -> Result<usize, ApiError>
    where
        A: ApplianceApi + ?Sized,
    {
        let mut seen = HashSet::new();
        let wanted: Vec<ApplianceId> = ids
            .iter()
            .filter(|id| !self.infos.contains_key(id.pnc()))
            .filter(|id| seen.insert(id.pnc().to_string()))
            .cloned()
            .collect();

        if wanted.is_empty() {
            return Ok(0);
        }

        debug!(count = wanted.len(), "Fetching appliance info");
        let infos = api.appliance_info(&wanted).await?;

        let mut inserted = 0;
        for info in infos {
            if info.pnc.is_empty() {
                warn!("Ignoring appliance info without PNC");
                continue;
            }
            if !self.infos.contains_key(&info.pnc) {
                self.infos.insert(info.pnc.clone(), info);
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}
