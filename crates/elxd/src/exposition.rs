//! Prometheus text exposition of collected samples.

use elx_common::schema::{MetricDesc, MetricKind};
use elx_common::{MetricSample, VERSION};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Renders scrape output: static process metrics plus the samples of a pass.
///
/// Appliance metrics go into a fresh registry on every render, so a metric
/// that was not collected in this pass is absent instead of stale. Samples
/// are exported under the descriptors given at construction; a sample with
/// no descriptor fails the render.
pub struct Exposition {
    registry: Registry,
    descs: BTreeMap<&'static str, MetricDesc>,
}

impl Exposition {
    pub fn new(descs: Vec<MetricDesc>) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let build_info = GaugeVec::new(
            Opts::new("elxd_build_info", "Exporter build information"),
            &["version"],
        )?;
        registry.register(Box::new(build_info.clone()))?;
        build_info.with_label_values(&[VERSION]).set(1.0);

        let descs = descs.into_iter().map(|desc| (desc.name, desc)).collect();
        Ok(Self { registry, descs })
    }

    pub fn render(&self, samples: &[MetricSample]) -> prometheus::Result<String> {
        let mut families = self.registry.gather();
        families.extend(self.gather(samples)?);

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    fn gather(&self, samples: &[MetricSample]) -> prometheus::Result<Vec<MetricFamily>> {
        let registry = Registry::new();
        let mut gauges: BTreeMap<MetricKind, GaugeVec> = BTreeMap::new();

        for sample in samples {
            let gauge = match gauges.entry(sample.kind) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let desc = self.descs.get(sample.name()).ok_or_else(|| {
                        prometheus::Error::Msg(format!("undescribed metric {}", sample.name()))
                    })?;
                    let gauge = GaugeVec::new(Opts::new(desc.name, desc.help), desc.labels)?;
                    registry.register(Box::new(gauge.clone()))?;
                    entry.insert(gauge)
                }
            };

            let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
            gauge.get_metric_with_label_values(&labels)?.set(sample.value);
        }

        Ok(registry.gather())
    }
}
