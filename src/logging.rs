use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "warn";

/// Level used when `RUST_LOG` is unset: the command line first, then the
/// config file.
pub fn resolve_level<'a>(cli: Option<&'a str>, config: Option<&'a str>) -> &'a str {
    cli.or(config).unwrap_or(DEFAULT_LEVEL)
}

pub fn init_logging(cli: Option<&str>, config: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(resolve_level(cli, config)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
