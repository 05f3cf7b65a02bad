use {
    prometheus::{Registry, TextEncoder},
    prometheus_metric_storage::StorageRegistry,
    std::sync::OnceLock,
};

static REGISTRY: OnceLock<StorageRegistry> = OnceLock::new();

/// Installs the process wide registry with every metric name prefixed by
/// `prefix`.
///
/// Has to happen before the first metric is touched: fails once the registry
/// is in use.
pub fn setup_registry(prefix: Option<String>) -> Result<(), prometheus::Error> {
    let registry = Registry::new_custom(prefix, None)?;
    REGISTRY
        .set(StorageRegistry::new(registry))
        .map_err(|_| prometheus::Error::Msg("metrics registry is already in use".to_owned()))
}

pub fn get_registry() -> &'static Registry {
    get_storage_registry().registry()
}

/// Registry that `MetricStorage` structs register themselves with. Falls
/// back to an unprefixed registry when [`setup_registry`] wasn't called,
/// which is what unit tests get.
pub fn get_storage_registry() -> &'static StorageRegistry {
    REGISTRY.get_or_init(StorageRegistry::default)
}

/// Renders all metrics of `registry` in the prometheus text format.
pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = String::new();
    TextEncoder::new().encode_utf8(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_registered_metrics() {
        let counter = prometheus::IntCounter::new("test_counter", "a counter").unwrap();
        get_registry().register(Box::new(counter.clone())).unwrap();
        counter.inc();
        assert!(encode(get_registry()).unwrap().contains("test_counter 1"));
    }

    #[test]
    fn registry_can_not_be_replaced_once_used() {
        get_storage_registry();
        assert!(setup_registry(Some("late".to_owned())).is_err());
    }
}
