//! Metric samples emitted by a collection pass.

use crate::appliance::{Appliance, ApplianceInfo};
use crate::schema::{MetricKind, LABELS};

/// One labeled gauge value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub kind: MetricKind,
    pub labels: Vec<String>,
    pub value: f64,
}

impl MetricSample {
    pub fn name(&self) -> &'static str {
        self.kind.desc().name
    }

    /// Value of a label by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        LABELS
            .iter()
            .position(|l| *l == name)
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
    }
}

/// Label values for an appliance, in `LABELS` order.
pub fn label_values(info: &ApplianceInfo, appliance: &Appliance) -> Vec<String> {
    vec![
        info.pnc.clone(),
        info.brand.clone(),
        info.product_area.clone(),
        info.device_type.clone(),
        info.model.clone(),
        info.variant.clone(),
        appliance.id.to_string(),
        appliance.data.appliance_name.clone(),
        appliance.data.model_name.clone(),
    ]
}

/// Accumulates samples for one appliance under a fixed label tuple.
#[derive(Debug)]
pub struct SampleSink<'a> {
    labels: Vec<String>,
    out: &'a mut Vec<MetricSample>,
}

impl<'a> SampleSink<'a> {
    pub fn new(labels: Vec<String>, out: &'a mut Vec<MetricSample>) -> Self {
        Self { labels, out }
    }

    pub fn emit(&mut self, kind: MetricKind, value: f64) {
        self.out.push(MetricSample {
            kind,
            labels: self.labels.clone(),
            value,
        });
    }

    /// Emit only when a value is present.
    pub fn emit_opt(&mut self, kind: MetricKind, value: Option<f64>) {
        if let Some(v) = value {
            self.emit(kind, v);
        }
    }

    pub fn emit_int(&mut self, kind: MetricKind, value: Option<i64>) {
        self.emit_opt(kind, value.map(|v| v as f64));
    }

    pub fn emit_bool(&mut self, kind: MetricKind, value: Option<bool>) {
        self.emit_opt(kind, value.map(crate::resolve::bool_gauge));
    }
}
