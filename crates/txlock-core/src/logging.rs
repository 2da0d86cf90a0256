// Tracing setup for processes embedding the lock table

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Install a global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`, which defaults to "info".
/// Directives such as `"txlock_core=debug,info"` are accepted. With
/// `json_output` set, events are written as JSON lines instead of the pretty
/// human-readable format.
///
/// Fails if the filter cannot be parsed or a global subscriber is already
/// installed.
pub fn init_tracing(log_level: Option<&str>, json_output: Option<bool>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))?;

    let subscriber = Registry::default().with(env_filter);

    if json_output.unwrap_or(false) {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else {
        let fmt_layer = fmt::layer().pretty().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    }

    Ok(())
}
