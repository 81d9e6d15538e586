use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// HTTP stack internals stay quiet unless RUST_LOG asks for them
const QUIET_TARGETS: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

pub fn filter_directives(config: &AppConfig) -> String {
    format!("{},{}", config.log_level, QUIET_TARGETS)
}

pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        // console output goes to stderr so statement output on stdout stays clean
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let console_layer = fmt::layer()
            .with_target(false)
            .with_ansi(true)
            .with_writer(std::io::stderr);
        registry.with(file_layer).with(console_layer).init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        let config = AppConfig::from_yaml(
            r#"
log_level: "debug"
log_dir: "./logs"
log_file: "fints.log"
use_json: false
rotation: "never"
product_id: "X"
bank:
  url: "https://banking.example.com/fints"
  user_id: "u"
  pin_env: "P"
  account: "1"
  blz: 10000000
"#,
        )
        .unwrap();
        let directives = filter_directives(&config);
        assert!(directives.starts_with("debug,"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
