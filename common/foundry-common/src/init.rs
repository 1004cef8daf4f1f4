//! Logging initialization
//!
//! Provides standardized tracing setup for the foundry binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
///
/// Logs go to stderr so stdout stays reserved for rendered protocol output.
///
/// - `verbosity` maps the `-v` count: 0 warn, 1 info, 2 debug, 3+ trace
/// - `RUST_LOG` overrides the level when set
/// - `LOG_FORMAT=json` switches to structured JSON lines
///
/// # Example
///
/// ```rust,ignore
/// foundry_common::init_tracing("foundry", cli.verbose)?;
/// ```
pub fn init_tracing(crate_name: &str, verbosity: u8) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = format!("{}={}", crate_name, level_for(verbosity));
            EnvFilter::new(level_for(verbosity).to_string()).add_directive(directive.parse()?)
        }
    };

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Map a `-v` count to a tracing level
fn level_for(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Subscriber installation is process-global, so only the level mapping is tested here.
    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), tracing::Level::WARN);
        assert_eq!(level_for(1), tracing::Level::INFO);
        assert_eq!(level_for(2), tracing::Level::DEBUG);
        assert_eq!(level_for(7), tracing::Level::TRACE);
    }
}
