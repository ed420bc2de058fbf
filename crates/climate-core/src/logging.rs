//! Tracing subscriber setup for binaries embedding the core.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (falls back to `RUST_LOG`).
pub const LOG_ENV: &str = "CLIMATE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs a stderr `fmt` subscriber filtered by `CLIMATE_LOG` / `RUST_LOG`.
///
/// `verbose` raises the default level to `debug` for this crate family.
/// Calling it more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let filter = resolve_filter(verbose);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_filter(verbose: bool) -> EnvFilter {
    let from_env = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok()
        .and_then(|raw| match parse_filter(&raw) {
            Ok(filter) => Some(filter),
            Err(message) => {
                // subscriber isn't installed yet, so this can't go through tracing
                eprintln!("warning: {message}; using default log filter");
                None
            }
        });

    from_env.unwrap_or_else(|| {
        if verbose {
            EnvFilter::new("warn,climate=debug,climate_core=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    })
}

fn parse_filter(raw: &str) -> Result<EnvFilter, String> {
    let raw = raw.trim();
    EnvFilter::try_new(raw).map_err(|e| format!("invalid log filter {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_accepts_directives() {
        assert!(parse_filter(" warn,climate_core=debug ").is_ok());
    }

    #[test]
    fn test_parse_filter_reports_bad_level() {
        let err = parse_filter("climate_core=loud").unwrap_err();
        assert!(err.contains("invalid log filter \"climate_core=loud\""));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
