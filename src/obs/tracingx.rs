use tracing_subscriber::EnvFilter;

/// `RUST_LOG` quando definido; senão `info` com o census em `debug`.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,squid_census=debug"))
}
