use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

// Export special preconstructed counters for Teloxide's handlers.
pub static CMD_START_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_start", Opts::new("command_start_usage_total", "count of /start invocations"))
});
pub static CMD_WATCH_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_watch", Opts::new("command_watch_usage_total", "count of /watch invocations"))
});
pub static REFRESH_CYCLE_COUNTERS: Lazy<RefreshCycleCounters> = Lazy::new(|| {
    let opts = Opts::new("refresh_cycles_total", "count of announcement refresh cycles by their outcome");
    RefreshCycleCounters {
        published: Counter::new("refresh_cycle (published)", opts.clone().const_label("outcome", "published")),
        idle: Counter::new("refresh_cycle (idle)", opts.clone().const_label("outcome", "idle")),
        aborted: Counter::new("refresh_cycle (aborted)", opts.const_label("outcome", "aborted")),
    }
});


pub fn init() -> axum::Router {
    let prometheus = REGISTRY
        .register(&CMD_START_COUNTER)
        .register(&CMD_WATCH_COUNTER)
        .register(&REFRESH_CYCLE_COUNTERS.published)
        .register(&REFRESH_CYCLE_COUNTERS.idle)
        .register(&REFRESH_CYCLE_COUNTERS.aborted)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    axum::Router::new()
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            if let Err(e) = TextEncoder::new().encode(&metrics, &mut buffer) {
                log::error!("couldn't encode custom metrics: {e}");
            }
            let custom_metrics = String::from_utf8_lossy(&buffer);

            metric_handle.render() + custom_metrics.as_ref()
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}
pub struct RefreshCycleCounters {
    pub published: Counter,
    pub idle: Counter,
    pub aborted: Counter,
}
struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}
