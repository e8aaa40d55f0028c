use crate::{Membership, SharedIndex};
use gslb_controller_core::ObjectType;
use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeMetric},
    metrics::{gauge::ConstGauge, MetricType},
    registry::Registry,
};

#[derive(Debug)]
struct Instrumented(SharedIndex);

pub fn register(reg: &mut Registry, index: SharedIndex) {
    reg.register_collector(Box::new(Instrumented(index)));
}

impl Collector for Instrumented {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let this = self.0.read();

        for (membership, name, help) in [
            (
                Membership::Accepted,
                "accepted_index_size",
                "The number of objects accepted by the filter",
            ),
            (
                Membership::Rejected,
                "rejected_index_size",
                "The number of objects rejected by the filter",
            ),
        ] {
            let mut family = encoder.encode_descriptor(name, help, None, MetricType::Gauge)?;
            for object_type in [
                ObjectType::Service,
                ObjectType::Ingress,
                ObjectType::Route,
                ObjectType::Namespace,
            ] {
                for (cluster, size) in this.store(object_type).sizes(membership) {
                    let labels = [
                        ("object_type", object_type.as_str()),
                        ("cluster", &*cluster),
                    ];
                    let gauge = ConstGauge::new(size as u32);
                    let gauge_encoder = family.encode_family(&labels)?;
                    gauge.encode(gauge_encoder)?;
                }
            }
        }

        Ok(())
    }
}
