//! Logger setup based on `tracing-subscriber`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. The default filter
/// applies `default_level` to this binary and the Hanashi crates, and keeps
/// `tower_http` request tracing at the same level.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let crate_name = bin_name.replace('-', "_");
    let default_filter = format!(
        "{crate_name}={default_level},hanashi_server={default_level},tower_http={default_level}"
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logger_twice_does_not_panic() {
        // テスト項目: setup_logger を複数回呼び出してもパニックしない
        // when (操作):
        setup_logger("hanashi-server", "debug");
        setup_logger("hanashi-server", "info");

        // then (期待する結果): ここに到達すれば成功
        tracing::info!("logger initialized");
    }
}
