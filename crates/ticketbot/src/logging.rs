use opentelemetry_sdk::trace::{BatchConfig, RandomIdGenerator, Sampler, Tracer};
use tracing_subscriber::{
    filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info,ticketbot=trace,ticketbot_intake=trace,ticketbot_commands=debug,\
    serenity=info,serenity::http::ratelimiting=off,serenity::http::request=off";

/// Heartbeats would drown out every actual trace.
const TRACE_FILTER: &str = "trace,serenity::gateway::ws[send_heartbeat]=off";

/// Initializes logging to stdout and, if configured, trace export.
/// To export traces, set up the Opentelemetry environment variables:
///
/// ```sh
/// export OTEL_SERVICE_NAME=ticketbot
/// export OTEL_EXPORTER_OTLP_PROTOCOL="http/protobuf"
/// export OTEL_EXPORTER_OTLP_ENDPOINT="https://otlp.example.com/otlp"
/// ```
pub fn init_tracing() {
    // presence updates of every member would make up most of the log otherwise
    let remove_presence_updates = FilterFn::new(|m| {
        !(m.target() == "serenity::gateway::shard"
            && m.name() == "handle_gateway_dispatch"
            && m.fields()
                .field("event")
                .map_or(false, |event| event.as_ref().starts_with("PresenceUpdate")))
    });
    let logfmt = tracing_logfmt_otel::builder()
        .with_level(true)
        .with_target(true)
        .with_span_name(true)
        .with_otel_data(true)
        .with_file(true)
        .with_line(true)
        .layer();
    let sub = tracing_subscriber::registry()
        .with(log_filter())
        .with(remove_presence_updates)
        .with(logfmt);

    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_err() {
        sub.init();
        tracing::info!("No OTEL_EXPORTER_OTLP_ENDPOINT is set, only logging to stdout");
        return;
    }
    match otlp_tracer() {
        Ok(tracer) => {
            let telemetry = tracing_opentelemetry::layer()
                .with_location(true)
                .with_tracked_inactivity(true)
                .with_tracer(tracer)
                .with_filter(EnvFilter::new(TRACE_FILTER));
            sub.with(telemetry).init();
            tracing::info!("Exporting traces to OTEL_EXPORTER_OTLP_ENDPOINT");
        }
        Err(err) => {
            sub.init();
            tracing::error!(error.message = %err, "Failed to set up trace export, only logging to stdout");
        }
    }
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn otlp_tracer() -> Result<Tracer, opentelemetry::trace::TraceError> {
    opentelemetry::global::set_text_map_propagator(
        opentelemetry_sdk::propagation::TraceContextPropagator::new(),
    );
    let trace_config = opentelemetry_sdk::trace::config()
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(Sampler::AlwaysOn);
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_trace_config(trace_config)
        .with_exporter(opentelemetry_otlp::new_exporter().http())
        .with_batch_config(BatchConfig::default())
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}
