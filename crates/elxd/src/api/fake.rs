//! Scriptable in-memory API for tests.

use super::ApplianceApi;
use async_trait::async_trait;
use elx_common::{ApiError, Appliance, ApplianceId, ApplianceInfo};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct FakeState {
    appliances: Vec<Appliance>,
    /// Info keyed by PNC.
    infos: HashMap<String, ApplianceInfo>,
    fail_list: bool,
    fail_info: bool,
    delay: Option<Duration>,
    info_requests: Vec<Vec<ApplianceId>>,
}

/// Fake API with call counters and injectable failures and latency.
///
/// `max_in_flight` records the highest number of overlapping calls seen,
/// which lets tests observe whether callers serialize access.
#[derive(Default)]
pub struct FakeApplianceApi {
    state: Mutex<FakeState>,
    list_calls: AtomicUsize,
    info_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeApplianceApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_appliance(self, appliance: Appliance) -> Self {
        self.state().appliances.push(appliance);
        self
    }

    pub fn with_info(self, info: ApplianceInfo) -> Self {
        self.state().infos.insert(info.pnc.clone(), info);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state().delay = Some(delay);
        self
    }

    pub fn set_appliances(&self, appliances: Vec<Appliance>) {
        self.state().appliances = appliances;
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.state().fail_list = fail;
    }

    pub fn set_fail_info(&self, fail: bool) {
        self.state().fail_info = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Identifier batches passed to `appliance_info`, in call order.
    pub fn info_requests(&self) -> Vec<Vec<ApplianceId>> {
        self.state().info_requests.clone()
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ApplianceApi for FakeApplianceApi {
    async fn list_appliances(&self, _include_state: bool) -> Result<Vec<Appliance>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;

        let state = self.state();
        let result = if state.fail_list {
            Err(ApiError::Status {
                status: 503,
                body: "fake list failure".to_string(),
            })
        } else {
            Ok(state.appliances.clone())
        };
        drop(state);

        self.leave();
        result
    }

    async fn appliance_info(&self, ids: &[ApplianceId]) -> Result<Vec<ApplianceInfo>, ApiError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;

        let mut state = self.state();
        state.info_requests.push(ids.to_vec());
        let result = if state.fail_info {
            Err(ApiError::Http("fake info failure".to_string()))
        } else {
            Ok(ids
                .iter()
                .filter_map(|id| state.infos.get(id.pnc()).cloned())
                .collect())
        };
        drop(state);

        self.leave();
        result
    }
}
