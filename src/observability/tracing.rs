use std::sync::OnceLock;

use anyhow::{Context, Error, Result, anyhow};
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracer, SdkTracerProvider},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "objectivity-worker";

static TRACING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Installs the global subscriber once per process.
///
/// With `OTEL_EXPORTER_OTLP_ENDPOINT` set, spans are also exported over OTLP.
/// A failing exporter falls back to plain JSON logs.
///
/// # Errors
/// Returns an error when the subscriber cannot be installed.
pub fn init() -> Result<()> {
    TRACING_INIT
        .get_or_init(|| install().map_err(|error| error.to_string()))
        .clone()
        .map_err(|message| anyhow!(message))
}

fn install() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false).json();

    let Some(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| Error::msg(e.to_string()))?;
        info!(otel_enabled = false, "standard tracing initialized");
        return Ok(());
    };

    match init_tracer(&endpoint) {
        Ok(tracer) => {
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(otel_layer)
                .try_init()
                .map_err(|e| Error::msg(e.to_string()))?;
            info!(otel_enabled = true, endpoint = %endpoint, "tracing initialized with OpenTelemetry");
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| Error::msg(e.to_string()))?;
            info!(
                otel_enabled = false,
                error = %e,
                "tracing initialized without OpenTelemetry (init failed)"
            );
        }
    }
    Ok(())
}

/// Sampling ratio comes from `OTEL_SAMPLING_RATIO` (default 1.0).
fn init_tracer(endpoint: &str) -> Result<SdkTracer> {
    let sampling_ratio = std::env::var("OTEL_SAMPLING_RATIO")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.0);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to build OTLP span exporter")?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", SERVICE_NAME),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ])
        .build();

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::TraceIdRatioBased(sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build();

    let tracer = tracer_provider.tracer(SERVICE_NAME);
    global::set_tracer_provider(tracer_provider);

    Ok(tracer)
}
