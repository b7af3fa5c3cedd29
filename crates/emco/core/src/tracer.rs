use std::{env, ffi::OsStr};

#[cfg(feature = "otlp")]
use opentelemetry_otlp as otlp;
use tracing::{dispatcher, Subscriber};
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, Layer, Registry,
};

fn init_once_opentelemetry(export: bool) {
    #[cfg(feature = "otlp")]
    use opentelemetry_sdk::runtime::Tokio as Runtime;

    // Skip init if has been set
    if dispatcher::has_been_set() {
        return;
    }

    // Set default service name
    {
        const SERVICE_NAME_KEY: &str = "OTEL_SERVICE_NAME";
        const SERVICE_NAME_VALUE: &str = env!("CARGO_CRATE_NAME");

        if env::var_os(SERVICE_NAME_KEY).is_none() {
            env::set_var(SERVICE_NAME_KEY, SERVICE_NAME_VALUE);
        }
    }

    #[cfg(feature = "otlp")]
    fn init_otlp_pipeline() -> otlp::TonicExporterBuilder {
        otlp::new_exporter().tonic()
    }

    fn init_layer_env_filter<S>() -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        ::tracing_subscriber::EnvFilter::from_default_env()
    }

    fn init_layer_stdfmt<S>() -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        // logs go to stderr; stdout carries rendered views
        ::tracing_subscriber::fmt::layer().with_writer(::std::io::stderr)
    }

    #[cfg(feature = "metrics")]
    fn init_layer_otlp_metrics<S>() -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        otlp::new_pipeline()
            .metrics(Runtime)
            .with_exporter(init_otlp_pipeline())
            .build()
            .map(::tracing_opentelemetry::MetricsLayer::new)
            .expect("failed to init a metrics")
    }

    #[cfg(feature = "trace")]
    fn init_layer_otlp_tracer<S>() -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        otlp::new_pipeline()
            .tracing()
            .with_exporter(init_otlp_pipeline())
            .install_batch(Runtime)
            .map(::tracing_opentelemetry::OpenTelemetryLayer::new)
            .expect("failed to init a tracer")
    }

    let layer = Registry::default()
        .with(init_layer_env_filter())
        .with(init_layer_stdfmt());

    if export {
        #[cfg(feature = "metrics")]
        let layer = layer.with(init_layer_otlp_metrics());
        #[cfg(feature = "trace")]
        let layer = layer.with(init_layer_otlp_tracer());

        layer.init()
    } else {
        layer.init()
    }
}

pub fn init_once() {
    init_once_with_default(cfg!(feature = "otlp"))
}

pub fn init_once_with(level: impl AsRef<OsStr>, export: bool) {
    // Skip init if has been set
    if dispatcher::has_been_set() {
        return;
    }

    // set custom tracing level
    env::set_var(KEY, level);

    init_once_opentelemetry(export)
}

pub fn init_once_with_default(export: bool) {
    // Skip init if has been set
    if dispatcher::has_been_set() {
        return;
    }

    // set default tracing level
    if env::var_os(KEY).is_none() {
        env::set_var(KEY, "INFO");
    }

    init_once_opentelemetry(export)
}

/// Maps the number of `-d` flags to a tracing level.
pub fn level_of(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "WARN",
        1 => "INFO",
        2 => "DEBUG",
        _ => "TRACE",
    }
}

pub fn init_once_with_level_int(level: u8, export: bool) {
    init_once_with(level_of(level), export)
}

const KEY: &str = "RUST_LOG";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_of(0), "WARN");
        assert_eq!(level_of(1), "INFO");
        assert_eq!(level_of(2), "DEBUG");
        assert_eq!(level_of(3), "TRACE");
        assert_eq!(level_of(9), "TRACE");
    }
}
