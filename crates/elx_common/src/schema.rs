//! Metric schema registry.
//!
//! Static descriptors for every exported appliance metric. All metrics share
//! the same label set, built from the cached appliance info followed by the
//! appliance's own identity fields.

/// Full metric name: namespace, subsystem and the metric's own suffix.
macro_rules! metric_name {
    ($name:literal) => {
        concat!("electrolux", "_", "appliance", "_", $name)
    };
}

/// Prefix shared by every appliance metric name.
pub const PREFIX: &str = metric_name!("");

/// Ordered label names shared by all appliance metrics.
pub const LABELS: [&str; 9] = [
    // Appliance info
    "pnc",
    "brand",
    "product_area",
    "device_type",
    "model",
    "variant",
    // Appliance identity
    "appliance_id",
    "name",
    "model_name",
];

/// Immutable descriptor for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// Logical measurements exported per appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Connected,
    Workmode,
    DoorOpen,
    UiLight,
    SafetyLock,
    Ionizer,
    FilterLife,
    FilterType,
    Rssi,
    Fanspeed,
    FanspeedMax,
    FanspeedRaw,
    Temperature,
    Humidity,
    Pm1,
    Pm25,
    Pm10,
    Co2,
    TvocPpb,
    VocDensity,
}

impl MetricKind {
    /// Every metric, in export order.
    pub const ALL: [MetricKind; 20] = [
        MetricKind::Connected,
        MetricKind::Workmode,
        MetricKind::DoorOpen,
        MetricKind::UiLight,
        MetricKind::SafetyLock,
        MetricKind::Ionizer,
        MetricKind::FilterLife,
        MetricKind::FilterType,
        MetricKind::Rssi,
        MetricKind::Fanspeed,
        MetricKind::FanspeedMax,
        MetricKind::FanspeedRaw,
        MetricKind::Temperature,
        MetricKind::Humidity,
        MetricKind::Pm1,
        MetricKind::Pm25,
        MetricKind::Pm10,
        MetricKind::Co2,
        MetricKind::TvocPpb,
        MetricKind::VocDensity,
    ];

    pub fn desc(self) -> MetricDesc {
        let (name, help) = match self {
            MetricKind::Connected => (metric_name!("connected"), "Appliance is connected"),
            MetricKind::Workmode => (
                metric_name!("workmode"),
                "Work mode (PowerOff = 0, Manual = 1, Auto = 2, Quiet = 3)",
            ),
            MetricKind::DoorOpen => (metric_name!("door_open"), "Door is open"),
            MetricKind::UiLight => (metric_name!("ui_light"), "UI light enabled"),
            MetricKind::SafetyLock => (metric_name!("safety_lock"), "Safety lock enabled"),
            MetricKind::Ionizer => (metric_name!("ionizer"), "Ionizer enabled"),
            MetricKind::FilterLife => (metric_name!("filter_life"), "Filter life remaining"),
            MetricKind::FilterType => (metric_name!("filter_type_id"), "Filter type as numeric ID"),
            MetricKind::Rssi => (metric_name!("rssi"), "WiFi signal strength"),
            MetricKind::Fanspeed => (metric_name!("fanspeed"), "Fan speed"),
            MetricKind::FanspeedMax => (metric_name!("fanspeed_max"), "Maximum fan speed raw value"),
            MetricKind::FanspeedRaw => (metric_name!("fanspeed_raw"), "Fan speed (raw)"),
            MetricKind::Temperature => (metric_name!("temperature"), "Temperature in Celsius"),
            MetricKind::Humidity => (metric_name!("humidity"), "Relative humidity"),
            MetricKind::Pm1 => (metric_name!("pm1"), "PM1 in μg/m^3"),
            MetricKind::Pm25 => (metric_name!("pm25"), "PM2.5 in μg/m^3"),
            MetricKind::Pm10 => (metric_name!("pm10"), "PM10 in μg/m^3"),
            MetricKind::Co2 => (metric_name!("co2"), "CO2"),
            MetricKind::TvocPpb => (
                metric_name!("tvoc_ppb"),
                "Total volatile organic compounds in ppb",
            ),
            MetricKind::VocDensity => (
                metric_name!("voc_density"),
                "Volatile organic compound density in μg/m^3",
            ),
        };

        MetricDesc {
            name,
            help,
            labels: &LABELS,
        }
    }
}

/// All descriptors, in export order.
pub fn describe() -> Vec<MetricDesc> {
    MetricKind::ALL.iter().map(|kind| kind.desc()).collect()
}
