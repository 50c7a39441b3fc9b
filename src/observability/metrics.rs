use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub token_requests: IntCounterVec,
    pub path_writes: IntCounterVec,
    pub path_deletes: IntCounter,

    // Issuer metrics
    pub issuer_commands: IntCounterVec,
    pub issuer_command_failures: IntCounterVec,
    pub issuer_command_duration: HistogramVec,

    // Storage metrics
    pub storage_failures: IntCounterVec,
    pub cache_persist_failures: IntCounter,

    // Runtime
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("snctltokenagent".into()), None).expect("metrics registry");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Requests
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token reads by outcome"),&["outcome"],).expect("metric"),
            path_writes: IntCounterVec::new(Opts::new("path_writes_total", "Writes by kind"),&["kind"],).expect("metric"),
            path_deletes: IntCounter::new("path_deletes_total", "Deleted paths").expect("metric"),

            // Issuer
            issuer_commands: IntCounterVec::new(Opts::new("issuer_commands_total", "snctl invocations by command"),&["command"],).expect("metric"),
            issuer_command_failures: IntCounterVec::new(Opts::new("issuer_command_failures_total", "snctl failures by command and reason"),&["command", "reason"],).expect("metric"),
            issuer_command_duration: HistogramVec::new(HistogramOpts::new("issuer_command_duration_seconds", "snctl run time seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["command"],).expect("metric"),

            // Storage
            storage_failures: IntCounterVec::new(Opts::new("storage_failures_total", "Storage failures by operation"),&["operation"],).expect("metric"),
            cache_persist_failures: IntCounter::new("cache_persist_failures_total", "Refreshed token caches that could not be stored").expect("metric"),

            up: IntGauge::new("up", "Service up status (1 = up)").expect("metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_requests.clone())).expect("register metric");
        reg.register(Box::new(metrics.path_writes.clone())).expect("register metric");
        reg.register(Box::new(metrics.path_deletes.clone())).expect("register metric");
        reg.register(Box::new(metrics.issuer_commands.clone())).expect("register metric");
        reg.register(Box::new(metrics.issuer_command_failures.clone())).expect("register metric");
        reg.register(Box::new(metrics.issuer_command_duration.clone())).expect("register metric");
        reg.register(Box::new(metrics.storage_failures.clone())).expect("register metric");
        reg.register(Box::new(metrics.cache_persist_failures.clone())).expect("register metric");
        reg.register(Box::new(metrics.up.clone())).expect("register metric");

        metrics
    }
}
