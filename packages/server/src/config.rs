//! Command line / environment configuration.

use clap::Parser;

/// One-to-one chat server with real-time presence and delivery
#[derive(Debug, Clone, Parser)]
#[command(name = "hanashi-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HANASHI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "HANASHI_PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database URL (e.g. `sqlite:hanashi.db`); messages stay in memory when unset
    #[arg(long, env = "HANASHI_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "HANASHI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Origin allowed to make credentialed cross-origin requests
    #[arg(long, env = "HANASHI_FRONTEND_ORIGIN")]
    pub frontend_origin: Option<String>,
}

impl ServerConfig {
    /// `host:port` to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 引数なしでデフォルト値が使われる
        let config = ServerConfig::try_parse_from(["hanashi-server"]).unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_flags() {
        // テスト項目: フラグで設定を上書きできる
        let config = ServerConfig::try_parse_from([
            "hanashi-server",
            "--host",
            "0.0.0.0",
            "--port",
            "5000",
            "--database-url",
            "sqlite:hanashi.db",
            "--frontend-origin",
            "http://localhost:5173",
        ])
        .unwrap();

        assert_eq!(config.addr(), "0.0.0.0:5000");
        assert_eq!(config.database_url.as_deref(), Some("sqlite:hanashi.db"));
        assert_eq!(
            config.frontend_origin.as_deref(),
            Some("http://localhost:5173")
        );
    }
}
