//! Collector behavior against a scripted API.
//!
//! Covers device-type filtering, failure containment, info cache reuse
//! across passes, pass serialization and deadline/cancellation handling.

use elx_common::appliance::{ApplianceData, Properties};
use elx_common::schema::{MetricKind, LABELS};
use elx_common::{Appliance, ApplianceId, ApplianceInfo, MetricSample, ReportedState};
use elxd::api::FakeApplianceApi;
use elxd::collector::{Collector, CollectorOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// TEST HELPERS
// ============================================================================

const PURIFIER_PNC: &str = "950011538";
const DISHWASHER_PNC: &str = "911434834";

fn appliance(id: &str, name: &str, model_name: &str, reported: ReportedState) -> Appliance {
    Appliance {
        id: ApplianceId::new(id),
        data: ApplianceData {
            appliance_name: name.to_string(),
            model_name: model_name.to_string(),
        },
        connection_state: "Connected".to_string(),
        properties: Properties { reported },
    }
}

fn full_state() -> ReportedState {
    ReportedState {
        workmode: Some("Auto".to_string()),
        door_open: Some(false),
        ui_light: Some(true),
        safety_lock: Some(false),
        ionizer: Some(true),
        filter_life: Some(80),
        filter_type: Some(48),
        rssi: Some(-55),
        fanspeed: Some(3),
        temp: Some(22),
        humidity: Some(40),
        pm1: Some(1),
        pm2_5: Some(2),
        pm10: Some(3),
        eco2: Some(500),
        tvoc: Some(100),
        ..Default::default()
    }
}

fn info(pnc: &str, device_type: &str) -> ApplianceInfo {
    ApplianceInfo {
        pnc: pnc.to_string(),
        brand: "ELECTROLUX".to_string(),
        product_area: "WELLBEING".to_string(),
        device_type: device_type.to_string(),
        model: "PUREA9".to_string(),
        variant: "PUREA9".to_string(),
        ..Default::default()
    }
}

fn purifier() -> Appliance {
    appliance("950011538111111115087076", "Living room", "PUREA9", full_state())
}

fn dishwasher() -> Appliance {
    appliance("911434834222222225087076", "Kitchen", "GW60", full_state())
}

fn standard_api() -> FakeApplianceApi {
    FakeApplianceApi::new()
        .with_appliance(purifier())
        .with_appliance(dishwasher())
        .with_info(info(PURIFIER_PNC, "AIR_PURIFIER"))
        .with_info(info(DISHWASHER_PNC, "DISHWASHER"))
}

fn collector(api: &Arc<FakeApplianceApi>) -> Collector {
    Collector::new(api.clone(), CollectorOptions::default())
}

fn for_appliance<'a>(samples: &'a [MetricSample], id: &str) -> Vec<&'a MetricSample> {
    samples
        .iter()
        .filter(|s| s.label("appliance_id") == Some(id))
        .collect()
}

// ============================================================================
// DEVICE TYPE FILTERING
// ============================================================================

#[tokio::test]
async fn test_only_supported_device_type_emits() {
    let api = Arc::new(standard_api());
    let samples = collector(&api).collect().await;

    assert!(!samples.is_empty());
    assert!(for_appliance(&samples, "911434834222222225087076").is_empty());
    assert_eq!(
        for_appliance(&samples, "950011538111111115087076").len(),
        samples.len()
    );
    for sample in &samples {
        assert_eq!(sample.label("device_type"), Some("AIR_PURIFIER"));
    }
}

#[tokio::test]
async fn test_appliance_without_info_is_skipped() {
    let api = Arc::new(
        FakeApplianceApi::new()
            .with_appliance(appliance("123456789000", "Unknown", "PUREA9", full_state()))
            .with_info(info(PURIFIER_PNC, "AIR_PURIFIER")),
    );

    let samples = collector(&api).collect().await;
    assert!(samples.is_empty());
    assert_eq!(api.info_calls(), 1);
}

#[tokio::test]
async fn test_custom_device_type() {
    let api = Arc::new(standard_api());
    let options = CollectorOptions {
        device_type: "DISHWASHER".to_string(),
        ..Default::default()
    };
    let samples = Collector::new(api.clone(), options).collect().await;

    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| s.label("device_type") == Some("DISHWASHER")));
}

// ============================================================================
// SAMPLE SHAPE
// ============================================================================

#[tokio::test]
async fn test_labels_follow_schema() {
    let api = Arc::new(standard_api());
    let samples = collector(&api).collect().await;

    for sample in &samples {
        assert_eq!(sample.labels.len(), sample.kind.desc().labels.len());
        assert_eq!(sample.labels.len(), LABELS.len());
    }

    let first = &samples[0];
    assert_eq!(first.label("pnc"), Some(PURIFIER_PNC));
    assert_eq!(first.label("brand"), Some("ELECTROLUX"));
    assert_eq!(first.label("name"), Some("Living room"));
    assert_eq!(first.label("model_name"), Some("PUREA9"));
}

#[tokio::test]
async fn test_full_state_emits_every_metric_once() {
    let api = Arc::new(standard_api());
    let samples = collector(&api).collect().await;

    for kind in MetricKind::ALL {
        let count = samples.iter().filter(|s| s.kind == kind).count();
        assert_eq!(count, 1, "{:?} emitted {} times", kind, count);
    }
}

#[tokio::test]
async fn test_disconnected_appliance_still_reports() {
    let mut offline = purifier();
    offline.connection_state = "Disconnected".to_string();
    offline.properties.reported = ReportedState::default();

    let api = Arc::new(
        FakeApplianceApi::new()
            .with_appliance(offline)
            .with_info(info(PURIFIER_PNC, "AIR_PURIFIER")),
    );
    let samples = collector(&api).collect().await;

    let connected = samples.iter().find(|s| s.kind == MetricKind::Connected).unwrap();
    assert_eq!(connected.value, 0.0);
    assert_eq!(samples.len(), 2);
}

// ============================================================================
// FAILURE CONTAINMENT
// ============================================================================

#[tokio::test]
async fn test_list_failure_yields_nothing() {
    let api = Arc::new(standard_api());
    api.set_fail_list(true);

    let samples = collector(&api).collect().await;
    assert!(samples.is_empty());
    assert_eq!(api.list_calls(), 1);
    assert_eq!(api.info_calls(), 0);
}

#[tokio::test]
async fn test_info_failure_aborts_pass() {
    let api = Arc::new(standard_api());
    api.set_fail_info(true);

    let samples = collector(&api).collect().await;
    assert!(samples.is_empty());
    assert_eq!(api.info_calls(), 1);
}

#[tokio::test]
async fn test_recovers_after_failed_pass() {
    let api = Arc::new(standard_api());
    let collector = collector(&api);

    api.set_fail_list(true);
    assert!(collector.collect().await.is_empty());

    api.set_fail_list(false);
    assert!(!collector.collect().await.is_empty());
}

// ============================================================================
// INFO CACHE
// ============================================================================

#[tokio::test]
async fn test_info_fetched_once_across_passes() {
    let api = Arc::new(standard_api());
    let collector = collector(&api);

    let first = collector.collect().await;
    let second = collector.collect().await;

    assert_eq!(first, second);
    assert_eq!(api.list_calls(), 2);
    assert_eq!(api.info_calls(), 1);
}

#[tokio::test]
async fn test_new_appliance_fetches_only_unseen() {
    let api = Arc::new(standard_api());
    let collector = collector(&api);
    collector.collect().await;

    let extra = appliance("950011716333333335087076", "Bedroom", "WELLA7", full_state());
    api.set_appliances(vec![purifier(), dishwasher(), extra]);
    collector.collect().await;

    let requests = api.info_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].len(), 2);
    assert_eq!(requests[1], vec![ApplianceId::new("950011716333333335087076")]);
}

#[tokio::test]
async fn test_empty_listing_makes_no_info_call() {
    let api = Arc::new(FakeApplianceApi::new());
    let samples = collector(&api).collect().await;

    assert!(samples.is_empty());
    assert_eq!(api.list_calls(), 1);
    assert_eq!(api.info_calls(), 0);
}

// ============================================================================
// CONCURRENCY AND DEADLINES
// ============================================================================

#[tokio::test]
async fn test_concurrent_passes_are_serialized() {
    let api = Arc::new(standard_api().with_delay(Duration::from_millis(50)));
    let collector = Arc::new(collector(&api));

    let a = tokio::spawn({
        let collector = Arc::clone(&collector);
        async move { collector.collect().await }
    });
    let b = tokio::spawn({
        let collector = Arc::clone(&collector);
        async move { collector.collect().await }
    });

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(a, b);
    assert_eq!(api.list_calls(), 2);
    assert_eq!(api.info_calls(), 1);
    assert_eq!(api.max_in_flight(), 1);
}

#[tokio::test]
async fn test_slow_api_hits_deadline() {
    let api = Arc::new(standard_api().with_delay(Duration::from_millis(500)));
    let options = CollectorOptions {
        pass_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let samples = Collector::new(api.clone(), options).collect().await;

    assert!(samples.is_empty());
    assert_eq!(api.info_calls(), 0);
}

#[tokio::test]
async fn test_shutdown_cancels_in_flight_pass() {
    let api = Arc::new(standard_api().with_delay(Duration::from_secs(10)));
    let shutdown = CancellationToken::new();
    let collector = Arc::new(Collector::with_shutdown(
        api.clone(),
        CollectorOptions::default(),
        shutdown.clone(),
    ));

    let pass = tokio::spawn({
        let collector = Arc::clone(&collector);
        async move { collector.collect().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown.cancel();

    let samples = tokio::time::timeout(Duration::from_secs(2), pass)
        .await
        .unwrap()
        .unwrap();
    assert!(samples.is_empty());
}

#[tokio::test]
async fn test_closed_collector_emits_nothing() {
    let api = Arc::new(standard_api());
    let collector = collector(&api);
    collector.close();

    assert!(collector.collect().await.is_empty());
}
