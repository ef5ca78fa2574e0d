//! Field resolution: turns raw, partially populated reported state into
//! single authoritative values.
//!
//! Every function here is pure and total over its inputs. Unrecognized or
//! missing vendor data resolves to a sentinel or `None`, never an error.

use crate::appliance::Reading;

/// Work mode code for unrecognized or missing work mode strings.
pub const WORKMODE_UNKNOWN: i64 = -1;

/// Molecular weight of formaldehyde (CH2O) in g/mol.
pub const FORMALDEHYDE_MOLECULAR_WEIGHT: f64 = 30.026;

/// Standard atmospheric pressure in kPa.
pub const STANDARD_PRESSURE_KPA: f64 = 101.325;

/// Ideal gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.31446261815324;

/// 0°C in Kelvin.
pub const ZERO_CELSIUS_KELVIN: f64 = 273.15;

/// Temperature assumed for VOC conversion when none is reported.
pub const DEFAULT_TEMPERATURE_C: i64 = 25;

/// Map a work mode string to its numeric code.
pub fn workmode(mode: &str) -> i64 {
    match mode {
        "PowerOff" => 0,
        "Manual" => 1,
        "Auto" => 2,
        // Pure 500
        "Quiet" => 3,
        _ => WORKMODE_UNKNOWN,
    }
}

/// Pick between two independently optional readings.
///
/// With both present the secondary wins only if it was updated strictly
/// later than the primary; ties keep the primary.
pub fn latest<T>(primary: Option<Reading<T>>, secondary: Option<Reading<T>>) -> Option<Reading<T>> {
    match (primary, secondary) {
        (Some(p), Some(s)) => {
            if s.updated > p.updated {
                Some(s)
            } else {
                Some(p)
            }
        }
        (Some(p), None) => Some(p),
        (None, Some(s)) => Some(s),
        (None, None) => None,
    }
}

/// Remaining filter life as a 0.0-1.0 ratio.
pub fn filter_life(primary: Option<Reading<i64>>, secondary: Option<Reading<i64>>) -> Option<f64> {
    latest(primary, secondary).map(|r| r.value as f64 / 100.0)
}

/// CO2 from the measured and the estimated sensor, whichever is newer.
pub fn co2(measured: Option<Reading<i64>>, estimated: Option<Reading<i64>>) -> Option<i64> {
    latest(measured, estimated).map(|r| r.value)
}

/// PM2.5, falling back to the approximate value only when no direct reading exists.
pub fn pm25(direct: Option<i64>, approximate: Option<i64>) -> Option<i64> {
    direct.or(approximate)
}

/// Relative humidity percent as a 0.0-1.0 ratio.
pub fn humidity(percent: Option<i64>) -> Option<f64> {
    percent.map(|p| p as f64 / 100.0)
}

/// Convert TVOC in ppb to VOC density in μg/m^3.
///
/// density = P * MW * ppb / (R * (273.15 + T°C)), with P the standard
/// pressure in kPa and R the ideal gas constant. Missing temperature is
/// taken as 25°C. The result is rounded to two decimals.
pub fn voc_density(ppb: i64, temperature_c: Option<i64>, molecular_weight: f64) -> f64 {
    let temperature = temperature_c.unwrap_or(DEFAULT_TEMPERATURE_C) as f64;
    let density = (STANDARD_PRESSURE_KPA * molecular_weight * ppb as f64)
        / (GAS_CONSTANT * (ZERO_CELSIUS_KELVIN + temperature));
    round(density, 2)
}

pub fn bool_gauge(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

pub fn round(f: f64, decimals: i32) -> f64 {
    let shift = 10f64.powi(decimals);
    (f * shift).round() / shift
}
