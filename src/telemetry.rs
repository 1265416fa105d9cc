use anyhow::Result;
use std::time::Duration;

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter, MeterProvider},
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    resource::Resource,
    trace::SdkTracerProvider,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, Registry};

use crate::obs::tracingx::filter_from_env;

pub const ENV_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
pub const ENV_COMMIT_SHA: &str = "CENSUS_COMMIT_SHA";

pub struct Telemetry {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
    pub meter: Meter,
    pub voting_balance_latency_ms: Histogram<f64>,
    pub snapshot_voters: Counter<u64>,
}

impl Telemetry {
    pub fn shutdown(&self) {
        let _ = self.meter_provider.force_flush();
        let _ = self.tracer_provider.shutdown();
    }
}

fn commit_sha() -> String {
    std::env::var(ENV_COMMIT_SHA).unwrap_or_else(|_| "unknown".into())
}

/// Instala tracer e meter OTLP/HTTP globais e o subscriber `tracing` com a ponte OTel.
pub fn init(service_name: &str) -> Result<Telemetry> {
    let endpoint = std::env::var(ENV_OTLP_ENDPOINT).unwrap_or_else(|_| "http://localhost:4318".to_string());

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", service_name.to_string()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("git.commit.sha", commit_sha()),
        ])
        .build();

    // ---- Traces (OTLP/HTTP) ----
    let span_exporter = SpanExporter::builder().with_http().with_endpoint(&endpoint).build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    let tracer = tracer_provider.tracer("squid_census");

    // ---- Métricas (OTLP/HTTP) ----
    let metric_exporter = MetricExporter::builder().with_http().with_endpoint(&endpoint).build()?;

    let reader = PeriodicReader::builder(metric_exporter)
        .with_interval(Duration::from_secs(10))
        .build();

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build();

    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let subscriber = Registry::default()
        .with(filter_from_env())
        .with(fmt_layer)
        .with(otel_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    let meter = meter_provider.meter("squid_census");
    let voting_balance_latency_ms = meter
        .f64_histogram("voting_balance_latency_ms")
        .with_unit("ms")
        .with_description("Latency of voting balance reads in ms")
        .build();
    let snapshot_voters = meter
        .u64_counter("snapshot_voters")
        .with_description("Voters weighed by census snapshots")
        .build();

    Ok(Telemetry { tracer_provider, meter_provider, meter, voting_balance_latency_ms, snapshot_voters })
}

/// Só o subscriber `fmt`, sem exportadores. Para binários que rodam sem coletor.
pub fn init_fmt_only() {
    let subscriber = Registry::default()
        .with(filter_from_env())
        .with(tracing_subscriber::fmt::layer().with_target(false));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Cria um `Span` INFO com nome **estático** (exigência do tracing) e
/// coloca o nome dinâmico em `span_name`. Inclui `git_commit_sha`.
pub fn make_info_span(name: &str, op_id: u32, component: &str) -> tracing::Span {
    tracing::span!(
        target: "squid_census",
        Level::INFO,
        "op",
        git_commit_sha = %commit_sha(),
        span_name = %name,
        op_id = op_id,
        component = component
    )
}
