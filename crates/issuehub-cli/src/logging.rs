use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "ISSUEHUB_LOG";
const DEFAULT_DIRECTIVE: &str = "issuehub=info";
const VERBOSE_DIRECTIVE: &str = "issuehub=debug";

/// `-v` wins over `ISSUEHUB_LOG`, which wins over the default.
pub fn filter(verbose: u8, env_value: Option<&str>) -> EnvFilter {
    if verbose > 0 {
        return EnvFilter::new(VERBOSE_DIRECTIVE);
    }
    env_value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Events go to stderr; stdout carries command output and the MCP stream.
pub fn init(verbose: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter(verbose, env_value.as_deref()))
        .try_init();
}
