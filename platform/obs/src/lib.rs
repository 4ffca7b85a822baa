//! Tracing setup: env-filtered fmt output (pretty or JSON) with optional OTLP
//! span export.

use std::str::FromStr;

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static PROVIDER: OnceCell<Option<sdk::trace::SdkTracerProvider>> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,tower_http=warn";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown LOG_FORMAT {other:?} (expected pretty or json)")),
        }
    }
}

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
    pub format: LogFormat,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "employee-server",
            env_filter: None,
            otlp_endpoint: None,
            format: LogFormat::Pretty,
        }
    }
}

impl ObsConfig {
    /// Defaults overlaid with `RUST_LOG`, `OTLP_ENDPOINT` and `LOG_FORMAT`.
    pub fn from_env() -> Result<Self> {
        let format = match std::env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => LogFormat::default(),
        };
        Ok(Self {
            env_filter: std::env::var("RUST_LOG").ok(),
            otlp_endpoint: std::env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            format,
            ..Self::default()
        })
    }
}

/// Install tracing subscribers with optional OTLP exporter. Later calls are
/// no-ops.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if PROVIDER.get().is_some() {
        return Ok(());
    }

    let filter = config
        .env_filter
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let env_filter = EnvFilter::try_new(filter)?;

    let (json_layer, pretty_layer) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_target(false)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(false))),
    };
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer);

    let provider = match config.otlp_endpoint {
        Some(endpoint) => {
            let provider = otlp_provider(config.service_name, endpoint)?;
            let tracer = provider.tracer(config.service_name);
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
            Some(provider)
        }
        None => {
            registry.try_init()?;
            None
        }
    };

    PROVIDER
        .set(provider)
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}

fn otlp_provider(service_name: &'static str, endpoint: String) -> Result<sdk::trace::SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::builder().with_service_name(service_name).build();

    Ok(sdk::trace::SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Flush pending spans. Call once before the process exits.
pub fn shutdown_tracing() {
    if let Some(Some(provider)) = PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            eprintln!("failed to flush OTLP spans: {err}");
        }
    }
}
