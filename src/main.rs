use std::io::Write;

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use routegen::{resources::Ingress, Configuration, ResourceKey, RouteSetBuilder};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

pub struct Guard {
    _appender: WorkerGuard,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Guard {
    fn shutdown(self) {
        if let Some(tracer_provider) = self.tracer_provider {
            if let Err(e) = tracer_provider.shutdown() {
                warn!("Tracer provider shutdown failed {e:?}");
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CommandArgs {
    #[arg(long)]
    with_config_file: String,
    /// Knative Ingress manifest to translate into OpenShift routes.
    #[arg(long)]
    ingress_file: String,
}

fn init_tracing_logging(configuration: &Configuration) -> routegen::Result<Guard> {
    let registry = Registry::default();
    let controller_name = configuration.controller_name.clone();
    let file_appender = tracing_appender::rolling::never(".", "routegen.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);
    let file_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_FILE_LOG").unwrap_or_else(|_| "debug".to_owned()));
    let console_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_owned()));
    let tracing_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_TRACE_LOG").unwrap_or_else(|_| "info".to_owned()));

    // stdout carries the generated manifests
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(fmt::format().compact())
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_appender)
        .with_span_events(FmtSpan::NONE)
        .with_target(true)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(file_filter);

    if let Some(true) = configuration.enable_open_telemetry {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint("http://127.0.0.1:4317")
            .with_timeout(std::time::Duration::from_secs(3))
            .build()?;
        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_id_generator(RandomIdGenerator::default())
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(
                opentelemetry_sdk::Resource::builder()
                    .with_attributes(vec![opentelemetry::KeyValue::new("service.name", controller_name.clone())])
                    .build(),
            )
            .build();

        let tracer = tracer_provider.tracer(controller_name);
        let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

        registry.with(console_layer).with(file_layer).with(telemetry.with_filter(tracing_filter)).init();
        Ok(Guard { _appender: guard, tracer_provider: Some(tracer_provider) })
    } else {
        registry.with(console_layer).with(file_layer).init();
        Ok(Guard { _appender: guard, tracer_provider: None })
    }
}

fn run(configuration: &Configuration, ingress_file: &str) -> routegen::Result<()> {
    configuration.validate()?;
    let ingress: Ingress = serde_yaml::from_str(&std::fs::read_to_string(ingress_file)?)?;
    let route_set_builder = RouteSetBuilder::from_configuration(configuration);

    let routes = route_set_builder.make_routes(&ingress).inspect_err(|e| {
        warn!("Can't generate routes for {} {e} retryable = {}", ResourceKey::from(&ingress), e.is_retryable());
    })?;

    let mut stdout = std::io::stdout().lock();
    for route in &routes {
        info!("Writing {}", ResourceKey::from(route));
        writeln!(stdout, "---")?;
        serde_yaml::to_writer(&mut stdout, route)?;
    }
    stdout.flush()?;
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> routegen::Result<()> {
    let args = CommandArgs::parse();
    let configuration: Configuration = serde_yaml::from_str(&std::fs::read_to_string(args.with_config_file)?)?;
    let guard = init_tracing_logging(&configuration)?;

    let result = run(&configuration, &args.ingress_file);
    if let Err(e) = &result {
        warn!("routegen failed {e}");
    }
    guard.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use routegen::{Configuration, ConfigurationError};

    use super::run;

    #[test]
    pub fn test_run_returns_configuration_error() {
        let configuration = Configuration::builder().controller_name("").build();
        let error = run(&configuration, "ingress.yaml").unwrap_err();
        assert_eq!(error.downcast_ref::<ConfigurationError>(), Some(&ConfigurationError::ControllerName));
    }

    #[test]
    pub fn test_run_returns_missing_ingress_error() {
        let configuration = Configuration::builder().controller_name("routegen.knative.dev/controller").build();
        let error = run(&configuration, "does-not-exist/ingress.yaml").unwrap_err();
        assert!(error.downcast_ref::<std::io::Error>().is_some());
    }
}
