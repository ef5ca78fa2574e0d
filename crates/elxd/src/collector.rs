//! Collection orchestrator.
//!
//! Each call to [`Collector::collect`] lists the account's appliances, fills
//! the info cache for unseen ones, and turns every eligible appliance's
//! reported state into metric samples. Passes are serialized by one mutex
//! that also guards the info cache.

use crate::api::ApplianceApi;
use crate::cache::ApplianceInfoCache;
use elx_common::resolve::{self, FORMALDEHYDE_MOLECULAR_WEIGHT};
use elx_common::sample::{label_values, SampleSink};
use elx_common::schema::{self, MetricDesc, MetricKind};
use elx_common::{ApiError, Appliance, ApplianceInfo, FanSpeedTable, MetricSample, AIR_PURIFIER};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Deadline for the API calls of one collection pass.
pub const DEFAULT_PASS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Molecular weight of the reference gas in g/mol, for TVOC conversion.
    pub molecular_weight: f64,
    /// Only appliances of this device type produce samples.
    pub device_type: String,
    pub fan_speeds: FanSpeedTable,
    pub pass_timeout: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            molecular_weight: FORMALDEHYDE_MOLECULAR_WEIGHT,
            device_type: AIR_PURIFIER.to_string(),
            fan_speeds: FanSpeedTable::builtin(),
            pass_timeout: DEFAULT_PASS_TIMEOUT,
        }
    }
}

pub struct Collector {
    api: Arc<dyn ApplianceApi>,
    options: CollectorOptions,
    shutdown: CancellationToken,
    cache: Mutex<ApplianceInfoCache>,
}

impl Collector {
    pub fn new(api: Arc<dyn ApplianceApi>, options: CollectorOptions) -> Self {
        Self::with_shutdown(api, options, CancellationToken::new())
    }

    /// Collector whose in-flight API calls are aborted when `shutdown` fires.
    pub fn with_shutdown(
        api: Arc<dyn ApplianceApi>,
        options: CollectorOptions,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            api,
            options,
            shutdown,
            cache: Mutex::new(ApplianceInfoCache::new()),
        }
    }

    /// Descriptors of every metric this collector can emit.
    pub fn describe(&self) -> Vec<MetricDesc> {
        schema::describe()
    }

    /// Run one collection pass.
    ///
    /// API failures are logged and yield an empty result. Concurrent callers
    /// wait for the running pass to finish before starting their own.
    pub async fn collect(&self) -> Vec<MetricSample> {
        let mut cache = self.cache.lock().await;

        info!("Collecting metrics");
        let deadline = Instant::now() + self.options.pass_timeout;

        let appliances = match self.bounded(deadline, self.api.list_appliances(true)).await {
            Ok(appliances) => appliances,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Error fetching appliances");
                return Vec::new();
            }
        };

        let missing = cache.missing(&appliances);
        if let Err(e) = self
            .bounded(deadline, cache.fill(self.api.as_ref(), &missing))
            .await
        {
            warn!(error = %e, kind = e.kind(), "Error fetching appliance info");
            return Vec::new();
        }

        let mut samples = Vec::new();
        for appliance in &appliances {
            match cache.lookup(&appliance.id) {
                Some(info) if info.device_type == self.options.device_type => {
                    debug!(
                        appliance_id = %appliance.id,
                        name = %appliance.data.appliance_name,
                        "Collecting metrics for appliance"
                    );
                    appliance_samples(appliance, info, &self.options, &mut samples);
                }
                other => {
                    let device_type = other.map(|i| i.device_type.as_str()).unwrap_or("");
                    info!(
                        appliance_id = %appliance.id,
                        device_type,
                        "Skipping appliance with unsupported device type"
                    );
                }
            }
        }

        info!(appliances = appliances.len(), samples = samples.len(), "Metrics collected");
        samples
    }

    /// Abort in-flight and future API calls.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    async fn bounded<T, F>(&self, deadline: Instant, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ApiError::Cancelled),
            result = tokio::time::timeout_at(deadline, call) => match result {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(self.options.pass_timeout)),
            },
        }
    }
}

/// Resolve one appliance's reported state into samples.
pub fn appliance_samples(
    appliance: &Appliance,
    info: &ApplianceInfo,
    options: &CollectorOptions,
    out: &mut Vec<MetricSample>,
) {
    let reported = appliance.reported();
    let mut sink = SampleSink::new(label_values(info, appliance), out);

    sink.emit(MetricKind::Connected, resolve::bool_gauge(appliance.is_connected()));
    let workmode = resolve::workmode(reported.workmode.as_deref().unwrap_or(""));
    sink.emit(MetricKind::Workmode, workmode as f64);
    sink.emit_bool(MetricKind::DoorOpen, reported.door_open);
    sink.emit_bool(MetricKind::UiLight, reported.ui_light);
    sink.emit_bool(MetricKind::SafetyLock, reported.safety_lock);
    sink.emit_bool(MetricKind::Ionizer, reported.ionizer);

    let filter_life = resolve::filter_life(
        reported.filter_life_reading(),
        reported.filter_life_1_reading(),
    );
    sink.emit_opt(MetricKind::FilterLife, filter_life);
    sink.emit_int(MetricKind::FilterType, reported.filter_type);
    sink.emit_int(MetricKind::Rssi, reported.rssi);

    if let Some(raw) = reported.fanspeed {
        if let Some(speed) = options.fan_speeds.normalize(&appliance.data.model_name, raw) {
            sink.emit(MetricKind::Fanspeed, speed.ratio);
            sink.emit(MetricKind::FanspeedMax, speed.max);
        }
        sink.emit(MetricKind::FanspeedRaw, raw as f64);
    }

    sink.emit_int(MetricKind::Temperature, reported.temp);
    sink.emit_opt(MetricKind::Humidity, resolve::humidity(reported.humidity));

    sink.emit_int(MetricKind::Pm1, reported.pm1);
    sink.emit_int(
        MetricKind::Pm25,
        resolve::pm25(reported.pm2_5, reported.pm2_5_approximate),
    );
    sink.emit_int(MetricKind::Pm10, reported.pm10);

    if let Some(ppb) = reported.tvoc {
        sink.emit(MetricKind::TvocPpb, ppb as f64);
        let density = resolve::voc_density(ppb, reported.temp, options.molecular_weight);
        sink.emit(MetricKind::VocDensity, density);
    }

    let co2 = resolve::co2(reported.co2_reading(), reported.eco2_reading());
    sink.emit_int(MetricKind::Co2, co2);
}
