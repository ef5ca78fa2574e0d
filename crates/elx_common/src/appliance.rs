//! Appliance data model as returned by the cloud API.
//!
//! Every reported sensor field is optional: models and firmware versions
//! report different subsets, and an absent field is routine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Connection state string for an online appliance.
pub const CONNECTED: &str = "Connected";

/// Length of the product number code prefix of an appliance identifier.
const PNC_LEN: usize = 9;

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stable identifier of one physical appliance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplianceId(String);

impl ApplianceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Product number code: the leading nine characters of the identifier.
    ///
    /// Appliance info is keyed by this code. Identifiers shorter than the
    /// prefix are returned whole.
    pub fn pnc(&self) -> &str {
        match self.0.char_indices().nth(PNC_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ApplianceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One appliance from the listing call, with its current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appliance {
    #[serde(rename = "applianceId")]
    pub id: ApplianceId,

    #[serde(rename = "applianceData", default, deserialize_with = "null_as_default")]
    pub data: ApplianceData,

    #[serde(rename = "connectionState", default, deserialize_with = "null_as_default")]
    pub connection_state: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Properties,
}

impl Appliance {
    pub fn is_connected(&self) -> bool {
        self.connection_state == CONNECTED
    }

    pub fn reported(&self) -> &ReportedState {
        &self.properties.reported
    }
}

/// User-facing identity of an appliance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub appliance_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reported: ReportedState,
}

/// Volatile sensor and control snapshot reported by the appliance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedState {
    #[serde(rename = "Workmode", default)]
    pub workmode: Option<String>,
    #[serde(rename = "DoorOpen", default)]
    pub door_open: Option<bool>,
    #[serde(rename = "UILight", default)]
    pub ui_light: Option<bool>,
    #[serde(rename = "SafetyLock", default)]
    pub safety_lock: Option<bool>,
    #[serde(rename = "Ionizer", default)]
    pub ionizer: Option<bool>,

    #[serde(rename = "FilterLife", default)]
    pub filter_life: Option<i64>,
    #[serde(rename = "FilterLife_1", default)]
    pub filter_life_1: Option<i64>,
    #[serde(rename = "FilterType", default)]
    pub filter_type: Option<i64>,

    #[serde(rename = "RSSI", default)]
    pub rssi: Option<i64>,
    #[serde(rename = "Fanspeed", default)]
    pub fanspeed: Option<i64>,

    #[serde(rename = "Temp", default)]
    pub temp: Option<i64>,
    #[serde(rename = "Humidity", default)]
    pub humidity: Option<i64>,

    #[serde(rename = "PM1", default)]
    pub pm1: Option<i64>,
    #[serde(rename = "PM2_5", default)]
    pub pm2_5: Option<i64>,
    #[serde(rename = "PM2_5_approximate", default)]
    pub pm2_5_approximate: Option<i64>,
    #[serde(rename = "PM10", default)]
    pub pm10: Option<i64>,

    #[serde(rename = "CO2", default)]
    pub co2: Option<i64>,
    #[serde(rename = "ECO2", default)]
    pub eco2: Option<i64>,
    #[serde(rename = "TVOC", default)]
    pub tvoc: Option<i64>,

    #[serde(rename = "$metadata", default, deserialize_with = "null_as_default")]
    pub metadata: ReportedMetadata,
}

/// Per-field update timestamps for the fields that have competing sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedMetadata {
    #[serde(rename = "FilterLife", default)]
    pub filter_life: Option<FieldMetadata>,
    #[serde(rename = "FilterLife_1", default)]
    pub filter_life_1: Option<FieldMetadata>,
    #[serde(rename = "CO2", default)]
    pub co2: Option<FieldMetadata>,
    #[serde(rename = "ECO2", default)]
    pub eco2: Option<FieldMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    #[serde(rename = "$lastUpdated", default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn last_updated(meta: &Option<FieldMetadata>) -> Option<DateTime<Utc>> {
    meta.as_ref().and_then(|m| m.last_updated)
}

/// A reported value together with the time it was last updated.
///
/// A missing timestamp orders before any real timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<T> {
    pub value: T,
    pub updated: Option<DateTime<Utc>>,
}

impl<T> Reading<T> {
    pub fn new(value: T, updated: Option<DateTime<Utc>>) -> Self {
        Self { value, updated }
    }
}

impl ReportedState {
    pub fn filter_life_reading(&self) -> Option<Reading<i64>> {
        self.filter_life
            .map(|v| Reading::new(v, last_updated(&self.metadata.filter_life)))
    }

    pub fn filter_life_1_reading(&self) -> Option<Reading<i64>> {
        self.filter_life_1
            .map(|v| Reading::new(v, last_updated(&self.metadata.filter_life_1)))
    }

    pub fn co2_reading(&self) -> Option<Reading<i64>> {
        self.co2.map(|v| Reading::new(v, last_updated(&self.metadata.co2)))
    }

    pub fn eco2_reading(&self) -> Option<Reading<i64>> {
        self.eco2.map(|v| Reading::new(v, last_updated(&self.metadata.eco2)))
    }
}

/// Slow-changing descriptive metadata for an appliance model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pnc: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variant: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colour: String,
}
