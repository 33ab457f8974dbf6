use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::configuration::TelemetrySettings;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `telemetry.level`. Records from the `log`
/// crate (actix's request logger, the process-time middleware) are forwarded
/// into the same subscriber.
pub fn init_telemetry(settings: &TelemetrySettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if settings.json {
        registry
            .with(fmt::layer().with_writer(std::io::stdout).json())
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}
