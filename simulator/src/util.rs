use std::any::Any;

use tracing_forest::ForestLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the profiling backend alive; traces are flushed when it drops.
#[must_use = "dropping the guard stops profiling output"]
pub struct LoggerGuard(#[allow(dead_code)] Option<Box<dyn Any>>);

/// Installs the global subscriber: a `tracing-forest` tree filtered by
/// `RUST_LOG` (default `info`), or the `tracing-profile` backend when one of
/// the profiling features is enabled.
pub fn init_logger() -> anyhow::Result<LoggerGuard> {
    if cfg!(feature = "tracing-profile") || cfg!(feature = "perfetto") {
        use tracing_profile::init_tracing;
        let guard = init_tracing()
            .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err:?}"))?;
        Ok(LoggerGuard(Some(Box::new(guard))))
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(ForestLayer::default())
            .try_init()?;
        Ok(LoggerGuard(None))
    }
}
