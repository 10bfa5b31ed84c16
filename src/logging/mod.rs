use crate::config::LogLevel;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_wasm::{WASMLayer, WASMLayerConfigBuilder};

/// Most verbose level emitted for `level`, `None` when logging is off.
pub(crate) fn max_level(level: LogLevel) -> Option<Level> {
    match level {
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Off => None,
    }
}

/// Routes `tracing` events to the browser console.
///
/// The first call installs the subscriber; later ones (one per mounted view)
/// leave it in place.
pub(crate) fn init(level: LogLevel) {
    let Some(max) = max_level(level) else {
        return;
    };
    let config = WASMLayerConfigBuilder::new()
        .set_max_level(max)
        .set_report_logs_in_timings(false)
        .build();
    let subscriber = tracing_subscriber::registry().with(WASMLayer::new(config));
    let _ = tracing::subscriber::set_global_default(subscriber);
}
