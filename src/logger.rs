use env_logger::{Builder, Env};

/// Installs the global logger.
///
/// `LOG_LEVEL` takes an `env_logger` filter (default `info`), `LOG_STYLE` controls coloring.
pub fn setup_logger() {
    let env = Env::new()
        .filter_or("LOG_LEVEL", "info")
        .write_style_or("LOG_STYLE", "auto");

    Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    log::info!(target: "init", package = env!("CARGO_PKG_NAME"), version = env!("CARGO_PKG_VERSION"); "Logger initialized.");
}
